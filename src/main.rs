use anyhow::{Context, Result};
use bench_scraper::utils::logging;
use bench_scraper::{App, Category, Config};
use std::path::PathBuf;

const USAGE: &str = "用法 / Usage:
  bench_scraper fetch <cpu|gpu> [min_id] [max_id]   全量更新，抓取并导出
  bench_scraper process <file.json>...             读取本地 JSON，合并并导出

配置文件路径由 BENCH_CONFIG 指定（默认 config.toml）";

/// 运行模式
enum Mode {
    Fetch {
        category: Category,
        lower: Option<u32>,
        upper: Option<u32>,
    },
    Process {
        files: Vec<PathBuf>,
    },
}

fn parse_args(args: &[String]) -> Result<Mode> {
    let parse_id = |value: Option<&String>| -> Result<Option<u32>> {
        value
            .map(|v| v.parse::<u32>().with_context(|| format!("无效的 ID: {}", v)))
            .transpose()
    };

    match args.first().map(String::as_str) {
        Some("fetch") => {
            let category = args
                .get(1)
                .and_then(|s| Category::parse(s))
                .with_context(|| format!("请选择 cpu 或 gpu\n\n{}", USAGE))?;
            Ok(Mode::Fetch {
                category,
                lower: parse_id(args.get(2))?,
                upper: parse_id(args.get(3))?,
            })
        }
        Some("process") => Ok(Mode::Process {
            files: args[1..].iter().map(PathBuf::from).collect(),
        }),
        _ => anyhow::bail!("输入错误！Invalid input!\n\n{}", USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config_path = std::env::var("BENCH_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path).await?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_args(&args)?;

    // 初始化并运行应用
    let app = App::initialize(config)?;
    match mode {
        Mode::Fetch {
            category,
            lower,
            upper,
        } => {
            let space = app.id_space(category, lower, upper)?;
            app.run_full_update(&space).await?;
        }
        Mode::Process { files } => {
            app.run_process_local(&files).await?;
        }
    }

    Ok(())
}
