//! usuarios 模块的数据访问层
//! Data access layer for the usuarios module

use crate::error::{AppError, AppResult};
use sqlx::PgPool;

use super::models::{
    CategoriaFavorita, ComentarioResumen, FavoritaResumen, Mensaje, Perfil, Usuario,
};

// ==================== 用户 / Users ====================

/// 注册新用户：用户行与资料行在同一事务中创建
/// Registration: the user row and its profile row are created in one transaction
pub async fn registrar(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> AppResult<Usuario> {
    let mut tx = pool.begin().await?;

    let usuario = sqlx::query_as::<_, Usuario>(
        "INSERT INTO usuarios (username, password_hash, email, first_name, last_name) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO perfiles (user_id) VALUES ($1)")
        .bind(usuario.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(usuario)
}

pub async fn buscar_por_id(pool: &PgPool, id: i64) -> AppResult<Usuario> {
    let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("usuario"))?;
    Ok(usuario)
}

pub async fn buscar_por_username(pool: &PgPool, username: &str) -> AppResult<Usuario> {
    let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("usuario"))?;
    Ok(usuario)
}

pub async fn actualizar_usuario(
    pool: &PgPool,
    id: i64,
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> AppResult<Usuario> {
    let usuario = sqlx::query_as::<_, Usuario>(
        "UPDATE usuarios SET username = $2, email = $3, first_name = $4, last_name = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await?;
    Ok(usuario)
}

pub async fn actualizar_password(pool: &PgPool, id: i64, password_hash: &str) -> AppResult<()> {
    sqlx::query("UPDATE usuarios SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn registrar_last_login(pool: &PgPool, id: i64) -> AppResult<()> {
    sqlx::query("UPDATE usuarios SET last_login = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn listar_usuarios(pool: &PgPool) -> AppResult<Vec<Usuario>> {
    let usuarios = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios ORDER BY username")
        .fetch_all(pool)
        .await?;
    Ok(usuarios)
}

/// 按 id 批量取用户（收件箱会话的对方信息）
pub async fn buscar_por_ids(pool: &PgPool, ids: &[i64]) -> AppResult<Vec<Usuario>> {
    let usuarios = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(usuarios)
}

// ==================== 资料 / Profiles ====================

pub async fn perfil_de(pool: &PgPool, user_id: i64) -> AppResult<Perfil> {
    let perfil = sqlx::query_as::<_, Perfil>("SELECT * FROM perfiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("perfil"))?;
    Ok(perfil)
}

#[allow(clippy::too_many_arguments)]
pub async fn actualizar_perfil(
    pool: &PgPool,
    user_id: i64,
    avatar: Option<&str>,
    nickname: Option<&str>,
    fecha_nacimiento: Option<chrono::NaiveDate>,
    localidad: Option<&str>,
    pais: Option<&str>,
    acerca_de_mi: Option<&str>,
) -> AppResult<Perfil> {
    let perfil = sqlx::query_as::<_, Perfil>(
        "UPDATE perfiles SET avatar = $2, nickname = $3, fecha_nacimiento = $4, \
         localidad = $5, pais = $6, acerca_de_mi = $7 \
         WHERE user_id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(avatar)
    .bind(nickname)
    .bind(fecha_nacimiento)
    .bind(localidad)
    .bind(pais)
    .bind(acerca_de_mi)
    .fetch_one(pool)
    .await?;
    Ok(perfil)
}

/// 更新通知与隐私开关
pub async fn actualizar_seguridad(
    pool: &PgPool,
    user_id: i64,
    recibir_emails_recetas_nuevas: bool,
    recibir_emails_mensajes_privados: bool,
    permitir_mensajes_privados: bool,
    mostrar_cumpleanos: bool,
    mostrar_edad: bool,
) -> AppResult<Perfil> {
    let perfil = sqlx::query_as::<_, Perfil>(
        "UPDATE perfiles SET recibir_emails_recetas_nuevas = $2, \
         recibir_emails_mensajes_privados = $3, permitir_mensajes_privados = $4, \
         mostrar_cumpleanos = $5, mostrar_edad = $6 \
         WHERE user_id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(recibir_emails_recetas_nuevas)
    .bind(recibir_emails_mensajes_privados)
    .bind(permitir_mensajes_privados)
    .bind(mostrar_cumpleanos)
    .bind(mostrar_edad)
    .fetch_one(pool)
    .await?;
    Ok(perfil)
}

// ==================== 收藏分组 / Favorite categories ====================

pub async fn listar_categorias_favoritas(
    pool: &PgPool,
    user_id: i64,
) -> AppResult<Vec<CategoriaFavorita>> {
    let categorias = sqlx::query_as::<_, CategoriaFavorita>(
        "SELECT * FROM categorias_favoritas WHERE user_id = $1 ORDER BY nombre",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(categorias)
}

pub async fn crear_categoria_favorita(
    pool: &PgPool,
    user_id: i64,
    nombre: &str,
) -> AppResult<CategoriaFavorita> {
    let categoria = sqlx::query_as::<_, CategoriaFavorita>(
        "INSERT INTO categorias_favoritas (user_id, nombre) VALUES ($1, $2) RETURNING *",
    )
    .bind(user_id)
    .bind(nombre)
    .fetch_one(pool)
    .await?;
    Ok(categoria)
}

pub async fn renombrar_categoria_favorita(
    pool: &PgPool,
    user_id: i64,
    id: i64,
    nombre: &str,
) -> AppResult<CategoriaFavorita> {
    let categoria = sqlx::query_as::<_, CategoriaFavorita>(
        "UPDATE categorias_favoritas SET nombre = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(nombre)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("categoría de favoritos"))?;
    Ok(categoria)
}

pub async fn eliminar_categoria_favorita(pool: &PgPool, user_id: i64, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM categorias_favoritas WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("categoría de favoritos"));
    }
    Ok(())
}

// ==================== 收藏 / Favorites ====================

pub async fn favoritas_de(pool: &PgPool, user_id: i64) -> AppResult<Vec<FavoritaResumen>> {
    let favoritas = sqlx::query_as::<_, FavoritaResumen>(
        "SELECT f.id, f.fecha_agregado, f.categoria_id, \
                r.id AS receta_id, r.titulo AS receta_titulo, r.imagen AS receta_imagen \
         FROM recetas_favoritas f \
         JOIN recetas r ON r.id = f.receta_id \
         WHERE f.user_id = $1 \
         ORDER BY f.fecha_agregado DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(favoritas)
}

/// 当前用户已收藏的菜谱 id 集合（列表页的心形图标）
pub async fn ids_favoritas(pool: &PgPool, user_id: i64) -> AppResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT receta_id FROM recetas_favoritas WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn es_favorita(pool: &PgPool, user_id: i64, receta_id: i64) -> AppResult<bool> {
    let existe = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM recetas_favoritas WHERE user_id = $1 AND receta_id = $2",
    )
    .bind(user_id)
    .bind(receta_id)
    .fetch_optional(pool)
    .await?;
    Ok(existe.is_some())
}

/// 收藏开关：已收藏则取消，未收藏则加入。返回操作后的收藏状态
/// Toggle: delete when present, insert when absent. Returns the resulting state
pub async fn toggle_favorito(pool: &PgPool, user_id: i64, receta_id: i64) -> AppResult<bool> {
    let existente = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM recetas_favoritas WHERE user_id = $1 AND receta_id = $2",
    )
    .bind(user_id)
    .bind(receta_id)
    .fetch_optional(pool)
    .await?;

    match existente {
        Some(id) => {
            sqlx::query("DELETE FROM recetas_favoritas WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;
            Ok(false)
        }
        None => {
            sqlx::query("INSERT INTO recetas_favoritas (user_id, receta_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(receta_id)
                .execute(pool)
                .await?;
            Ok(true)
        }
    }
}

/// 把菜谱放入某个收藏分组：收藏行不存在时先创建（upsert）
pub async fn asignar_categoria(
    pool: &PgPool,
    user_id: i64,
    receta_id: i64,
    categoria_id: i64,
) -> AppResult<()> {
    // 分组必须属于当前用户
    let propia = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM categorias_favoritas WHERE id = $1 AND user_id = $2",
    )
    .bind(categoria_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    if propia.is_none() {
        return Err(AppError::not_found("categoría de favoritos"));
    }

    sqlx::query(
        "INSERT INTO recetas_favoritas (user_id, receta_id, categoria_id) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, receta_id) DO UPDATE SET categoria_id = EXCLUDED.categoria_id",
    )
    .bind(user_id)
    .bind(receta_id)
    .bind(categoria_id)
    .execute(pool)
    .await?;
    Ok(())
}

// ==================== 私信 / Private messages ====================

/// 当前用户参与的全部消息，时间倒序（收件箱分组的输入）
pub async fn mensajes_de_usuario(pool: &PgPool, user_id: i64) -> AppResult<Vec<Mensaje>> {
    let mensajes = sqlx::query_as::<_, Mensaje>(
        "SELECT * FROM mensajes WHERE remitente_id = $1 OR destinatario_id = $1 \
         ORDER BY fecha_envio DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(mensajes)
}

/// 两个用户之间的完整会话，时间正序
pub async fn conversacion(pool: &PgPool, user_id: i64, other_id: i64) -> AppResult<Vec<Mensaje>> {
    let mensajes = sqlx::query_as::<_, Mensaje>(
        "SELECT * FROM mensajes \
         WHERE (remitente_id = $1 AND destinatario_id = $2) \
            OR (remitente_id = $2 AND destinatario_id = $1) \
         ORDER BY fecha_envio",
    )
    .bind(user_id)
    .bind(other_id)
    .fetch_all(pool)
    .await?;
    Ok(mensajes)
}

/// 打开会话时把对方发来的未读消息标记为已读
pub async fn marcar_leidos(pool: &PgPool, user_id: i64, other_id: i64) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE mensajes SET leido = TRUE \
         WHERE destinatario_id = $1 AND remitente_id = $2 AND leido = FALSE",
    )
    .bind(user_id)
    .bind(other_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn enviar_mensaje(
    pool: &PgPool,
    remitente_id: i64,
    destinatario_id: i64,
    asunto: &str,
    cuerpo: &str,
) -> AppResult<Mensaje> {
    let mensaje = sqlx::query_as::<_, Mensaje>(
        "INSERT INTO mensajes (remitente_id, destinatario_id, asunto, cuerpo) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(remitente_id)
    .bind(destinatario_id)
    .bind(asunto)
    .bind(cuerpo)
    .fetch_one(pool)
    .await?;
    Ok(mensaje)
}

/// 未读消息数（收件箱角标）
pub async fn no_leidos(pool: &PgPool, user_id: i64) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM mensajes WHERE destinatario_id = $1 AND leido = FALSE",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

// ==================== 本人评论 / Own comments ====================

/// 当前用户的顶层评论，时间倒序
pub async fn mis_comentarios(pool: &PgPool, user_id: i64) -> AppResult<Vec<ComentarioResumen>> {
    let comentarios = sqlx::query_as::<_, ComentarioResumen>(
        "SELECT c.id, c.texto, c.fecha_creacion, r.id AS receta_id, r.titulo AS receta_titulo \
         FROM comentarios c \
         JOIN recetas r ON r.id = c.receta_id \
         WHERE c.autor_id = $1 AND c.respuesta_a IS NULL \
         ORDER BY c.fecha_creacion DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(comentarios)
}
