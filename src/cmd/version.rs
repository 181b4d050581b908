/// 处理 version 命令：打印版本信息
pub fn handle_version_command() {
    println!("recetas-blog {}", env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
}
