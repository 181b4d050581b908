use clap::ArgMatches;
use std::error::Error;

use recetas_blog::cmd::handle_version_command;
use recetas_blog::comm::enhanced_config::EnhancedConfigManager;
use recetas_blog::{build_app, handle_command, init_commands, init_routes};
use recetas_blog::{AppBootstrap, AppConfig};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 初始化所有模块的命令
    init_commands();

    // 构建命令行应用
    let matches: ArgMatches = build_app().get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => {
            handle_server_command(sub_matches).await?;
        }
        Some(("version", _)) => {
            handle_version_command();
        }
        Some((command_name, sub_matches)) => {
            // 模块命令也可能需要路由信息
            init_routes();
            if let Err(e) = handle_command(command_name, sub_matches) {
                eprintln!("处理命令 '{}' 时出错: {}", command_name, e);
                std::process::exit(1);
            }
        }
        _ => {
            // 这种情况不应该发生，因为我们设置了 subcommand_required(true)
            eprintln!("未知命令，请使用 --help 查看可用命令");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn handle_server_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    // 初始化路由
    init_routes();

    // 创建并初始化增强的配置管理器
    let config_manager = EnhancedConfigManager::new().await?;

    // 验证必需的配置
    config_manager.validate_required_config()?;

    // 从配置管理器获取应用配置
    let app_config = config_manager.get_app_config();

    // 命令行参数优先于配置文件
    let host = matches
        .get_one::<String>("host")
        .cloned()
        .unwrap_or_else(|| app_config.server_host.clone());
    let port = matches
        .get_one::<String>("port")
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(app_config.server_port);

    let config = AppConfig {
        host,
        port,
        workers: app_config.server_workers,
        debug: app_config.server_debug,
    };

    // 启动应用
    AppBootstrap::new().with_config(config).run().await?;

    Ok(())
}
