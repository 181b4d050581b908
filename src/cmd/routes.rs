use clap::Command;

use crate::command_registry::CommandModule;
use crate::route_registry::print_global_routes_info;

/// routes 命令：打印已注册的路由组
pub struct RoutesCommand;

impl CommandModule for RoutesCommand {
    fn module_name(&self) -> &'static str {
        "routes"
    }

    fn register_commands(&self) -> Vec<Command> {
        vec![Command::new("routes").about("列出已注册的路由组")]
    }

    fn handle_command(
        &self,
        command_name: &str,
        _matches: &clap::ArgMatches,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match command_name {
            "routes" => {
                print_global_routes_info();
                Ok(())
            }
            other => Err(format!("命令 '{}' 不属于此模块", other).into()),
        }
    }
}
