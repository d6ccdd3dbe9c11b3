use std::path::Path;

use anyhow::Result;
use simulado_runner::config::Config;
use simulado_runner::error::ConfigError;
use simulado_runner::orchestrator::parse_create_args;
use simulado_runner::utils::logging;
use simulado_runner::App;

const USAGE: &str = "用法:
  simulado run <session_id>                          进行一次模拟考试
  simulado result <session_id>                       查询已提交的结果
  simulado create <banca> <题数> <分钟> <科目,...>   在后端生成模拟考试
  simulado recover <session_id>                      查看本地保存的作答
  simulado analyze <file> [banca]                    分析公告文本
  simulado analyze --sample                          查看示例分析结果";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let app = App::initialize(config);
    match command.as_str() {
        "run" => app.run_session(required(&args, 1, "session_id")?).await?,
        "result" => app.show_result(required(&args, 1, "session_id")?).await?,
        "create" => {
            let simulado = parse_create_args(&args[1..]).ok_or_else(|| {
                ConfigError::MissingArgument(format!("<banca> <题数> <分钟> <科目,...>\n{}", USAGE))
            })?;
            let id = app.create(&simulado).await?;
            println!("simulado run {}", id);
        }
        "recover" => app.recover(required(&args, 1, "session_id")?).await?,
        "analyze" => match required(&args, 1, "file")? {
            "--sample" => app.analyze_sample().await?,
            file => {
                app.analyze(Path::new(file), args.get(2).map(String::as_str))
                    .await?
            }
        },
        other => {
            eprintln!("未知命令: {}\n{}", other, USAGE);
        }
    }

    Ok(())
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, ConfigError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingArgument(format!("{}\n{}", name, USAGE)))
}
