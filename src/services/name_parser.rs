//! 设备名称解析服务 - 业务能力层
//!
//! 只负责"从名称中拆出厂商和型号"能力，不关心流程

use crate::error::AppResult;
use crate::models::Category;
use phf::phf_map;
use regex::Regex;

/// 厂商名本身，会从型号中去掉
static VENDOR_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "intel" => "Intel",
    "amd" => "AMD",
    "ati" => "AMD",
    "nvidia" => "NVIDIA",
    "apple" => "Apple",
    "qualcomm" => "Qualcomm",
    "mediatek" => "MediaTek",
    "samsung" => "Samsung",
    "hygon" => "Hygon",
    "zhaoxin" => "Zhaoxin",
    "arm" => "ARM",
};

/// CPU 品牌词，保留在型号中
static CPU_BRANDS: phf::Map<&'static str, &'static str> = phf_map! {
    "core" => "Intel",
    "xeon" => "Intel",
    "pentium" => "Intel",
    "celeron" => "Intel",
    "atom" => "Intel",
    "ryzen" => "AMD",
    "athlon" => "AMD",
    "epyc" => "AMD",
    "threadripper" => "AMD",
    "phenom" => "AMD",
    "snapdragon" => "Qualcomm",
    "dimensity" => "MediaTek",
    "exynos" => "Samsung",
    "m1" => "Apple",
    "m2" => "Apple",
    "m3" => "Apple",
    "m4" => "Apple",
};

/// GPU 品牌词，保留在型号中
static GPU_BRANDS: phf::Map<&'static str, &'static str> = phf_map! {
    "geforce" => "NVIDIA",
    "quadro" => "NVIDIA",
    "titan" => "NVIDIA",
    "rtx" => "NVIDIA",
    "gtx" => "NVIDIA",
    "radeon" => "AMD",
    "firepro" => "AMD",
    "arc" => "Intel",
    "iris" => "Intel",
    "uhd" => "Intel",
    "adreno" => "Qualcomm",
    "mali" => "ARM",
};

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub vendor: String,
    pub model: String,
}

/// 设备名称解析服务
///
/// 职责：
/// - 识别厂商（厂商名或品牌词）
/// - 去掉商标符号、频率后缀、"Processor" 等噪声，得到型号
/// - 无法识别时返回 None，由调用方决定如何降级
pub struct NameParser {
    category: Category,
    noise: Vec<Regex>,
    brands: &'static phf::Map<&'static str, &'static str>,
}

impl NameParser {
    /// 创建指定类别的解析器
    pub fn new(category: Category) -> AppResult<Self> {
        let mut noise = vec![
            Regex::new(r"(?i)\((r|tm)\)|®|™")?,
            Regex::new(r"(?i)\s*@\s*[\d.]+\s*[gm]hz.*$")?,
        ];

        let brands = match category {
            Category::Cpu => {
                noise.push(Regex::new(r"(?i)\s+(with|w/)\s+radeon.*$")?);
                noise.push(Regex::new(r"(?i)\b\d+-cores?\b")?);
                noise.push(Regex::new(r"(?i)\b(cpu|processor)\b")?);
                &CPU_BRANDS
            }
            Category::Gpu => {
                noise.push(Regex::new(r"(?i)\bgraphics\s+card\b")?);
                &GPU_BRANDS
            }
        };

        Ok(Self {
            category,
            noise,
            brands,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// 解析设备名称
    pub fn parse(&self, name: &str) -> Option<ParsedName> {
        let mut cleaned = name.to_string();
        for re in &self.noise {
            cleaned = re.replace_all(&cleaned, " ").into_owned();
        }

        let mut vendor: Option<&'static str> = None;
        let mut model_tokens = Vec::new();

        for token in cleaned.split_whitespace() {
            let key = token.to_ascii_lowercase();
            if let Some(found) = VENDOR_NAMES.get(key.as_str()) {
                vendor.get_or_insert(*found);
                continue;
            }
            if vendor.is_none() {
                vendor = self.brands.get(key.as_str()).copied();
            }
            model_tokens.push(token);
        }

        let model = model_tokens.join(" ");
        match vendor {
            Some(vendor) if !model.is_empty() => Some(ParsedName {
                vendor: vendor.to_string(),
                model,
            }),
            _ => None,
        }
    }
}
