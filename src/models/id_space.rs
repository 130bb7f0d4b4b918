use crate::error::{AppResult, StoreError};
use crate::models::Category;
use std::ops::RangeInclusive;

/// 待探测的 ID 范围（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSpace {
    lower_bound: u32,
    upper_bound: u32,
    category: Category,
}

impl IdSpace {
    /// 创建 ID 范围，要求 `0 < lower <= upper`
    pub fn new(category: Category, lower_bound: u32, upper_bound: u32) -> AppResult<Self> {
        if lower_bound == 0 || lower_bound > upper_bound {
            return Err(StoreError::InvalidRange {
                lower: lower_bound,
                upper: upper_bound,
            }
            .into());
        }
        Ok(Self {
            lower_bound,
            upper_bound,
            category,
        })
    }

    /// 使用类别默认范围，可单独覆盖上下界
    pub fn for_category(
        category: Category,
        lower_bound: Option<u32>,
        upper_bound: Option<u32>,
    ) -> AppResult<Self> {
        let (default_lower, default_upper) = category.default_id_range();
        Self::new(
            category,
            lower_bound.unwrap_or(default_lower),
            upper_bound.unwrap_or(default_upper),
        )
    }

    pub fn lower_bound(&self) -> u32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> u32 {
        self.upper_bound
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn ids(&self) -> RangeInclusive<u32> {
        self.lower_bound..=self.upper_bound
    }

    pub fn len(&self) -> usize {
        (self.upper_bound - self.lower_bound) as usize + 1
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids().contains(&id)
    }

    /// 按 `ids()` 顺序的第 `index` 个 ID
    pub fn id_at(&self, index: usize) -> Option<u32> {
        let offset = u32::try_from(index).ok()?;
        self.lower_bound
            .checked_add(offset)
            .filter(|id| *id <= self.upper_bound)
    }
}
