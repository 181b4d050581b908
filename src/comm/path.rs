use std::fs;
use std::path::PathBuf;

/// 项目数据目录
/// 创建并返回项目的主数据目录路径
pub fn p_data_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // 获取用户主目录
    let home_dir = dirs::home_dir().ok_or("无法获取用户主目录")?;

    let dir_path = home_dir.join(".recetas-blog");

    // 如果目录不存在则创建
    if !dir_path.exists() {
        fs::create_dir_all(&dir_path)?;
    }

    Ok(dir_path)
}

/// 媒体根目录：配置了 media.root 时使用配置值，否则使用数据目录下的 media/
/// Media root: configured media.root, or media/ under the data dir
pub fn p_media_path(configured_root: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let media_path = match configured_root {
        Some(root) if !root.is_empty() => PathBuf::from(root),
        _ => p_data_path()?.join("media"),
    };

    if !media_path.exists() {
        fs::create_dir_all(&media_path)?;
    }

    Ok(media_path)
}

/// 头像上传目录 media/avatars/
pub fn p_avatar_path(configured_root: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let avatar_path = p_media_path(configured_root)?.join("avatars");

    if !avatar_path.exists() {
        fs::create_dir_all(&avatar_path)?;
    }

    Ok(avatar_path)
}

/// 菜谱图片上传目录 media/recetas_imagenes/
pub fn p_receta_imagen_path(
    configured_root: Option<&str>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let imagen_path = p_media_path(configured_root)?.join("recetas_imagenes");

    if !imagen_path.exists() {
        fs::create_dir_all(&imagen_path)?;
    }

    Ok(imagen_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_functions() {
        // 测试各个路径函数是否能正常工作
        assert!(p_data_path().is_ok());
        assert!(p_media_path(None).is_ok());
        assert!(p_avatar_path(None).is_ok());
        assert!(p_receta_imagen_path(None).is_ok());
    }

    #[test]
    fn test_configured_media_root_wins() {
        let tmp = std::env::temp_dir().join("recetas-blog-test-media");
        let path = p_media_path(Some(tmp.to_str().unwrap())).unwrap();
        assert_eq!(path, tmp);
    }
}
