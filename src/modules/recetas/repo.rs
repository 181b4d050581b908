//! recetas 模块的数据访问层
//! Data access layer for the recetas module

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::comm::slug::slugify;
use crate::error::{AppError, AppResult};

use super::models::{
    Categoria, Comentario, ComentarioConAutor, Ingrediente, Paso, Receta, RecetaConFavoritos,
    RecetaInput,
};

/// 排序键白名单：未知键回退到默认排序
/// Sort-key whitelist: unknown keys fall back to the default ordering
pub fn order_clause(order_by: &str, direction: &str) -> &'static str {
    match (order_by, direction) {
        ("titulo", "asc") => "titulo ASC",
        ("titulo", _) => "titulo DESC",
        ("fecha_publicacion", "asc") => "fecha_publicacion ASC",
        _ => "fecha_publicacion DESC",
    }
}

/// 构造 ILIKE 模式，转义通配符
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

// ==================== 分类 / Categories ====================

pub async fn listar_categorias(pool: &PgPool) -> AppResult<Vec<Categoria>> {
    let categorias =
        sqlx::query_as::<_, Categoria>("SELECT * FROM categorias ORDER BY nombre")
            .fetch_all(pool)
            .await?;
    Ok(categorias)
}

pub async fn categoria_por_slug(pool: &PgPool, slug: &str) -> AppResult<Option<Categoria>> {
    let categoria = sqlx::query_as::<_, Categoria>("SELECT * FROM categorias WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(categoria)
}

pub async fn crear_categoria(pool: &PgPool, nombre: &str) -> AppResult<Categoria> {
    let slug = slugify(nombre);
    if slug.is_empty() {
        return Err(AppError::validation("nombre", "el nombre es obligatorio"));
    }
    let categoria = sqlx::query_as::<_, Categoria>(
        "INSERT INTO categorias (nombre, slug) VALUES ($1, $2) RETURNING *",
    )
    .bind(nombre)
    .bind(&slug)
    .fetch_one(pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Validation { .. } => AppError::validation("nombre", "la categoría ya existe"),
        other => other,
    })?;
    Ok(categoria)
}

/// 重命名分类，slug 随名称重新生成
pub async fn actualizar_categoria(
    pool: &PgPool,
    slug: &str,
    nombre: &str,
) -> AppResult<Categoria> {
    let nuevo_slug = slugify(nombre);
    if nuevo_slug.is_empty() {
        return Err(AppError::validation("nombre", "el nombre es obligatorio"));
    }
    let categoria = sqlx::query_as::<_, Categoria>(
        "UPDATE categorias SET nombre = $2, slug = $3 WHERE slug = $1 RETURNING *",
    )
    .bind(slug)
    .bind(nombre)
    .bind(&nuevo_slug)
    .fetch_optional(pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Validation { .. } => AppError::validation("nombre", "la categoría ya existe"),
        other => other,
    })?
    .ok_or_else(|| AppError::not_found("categoría"))?;
    Ok(categoria)
}

pub async fn eliminar_categoria(pool: &PgPool, slug: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM categorias WHERE slug = $1")
        .bind(slug)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("categoría"));
    }
    Ok(())
}

// ==================== 菜谱 / Recipes ====================

/// 列表查询：可选分类过滤 + 白名单排序
pub async fn listar_recetas(
    pool: &PgPool,
    categoria_id: Option<i64>,
    order_by: &str,
    direction: &str,
) -> AppResult<Vec<Receta>> {
    let sql = format!(
        "SELECT * FROM recetas \
         WHERE ($1::BIGINT IS NULL OR categoria_id = $1) \
         ORDER BY {}",
        order_clause(order_by, direction)
    );
    let recetas = sqlx::query_as::<_, Receta>(&sql)
        .bind(categoria_id)
        .fetch_all(pool)
        .await?;
    Ok(recetas)
}

pub async fn receta_por_id(pool: &PgPool, id: i64) -> AppResult<Receta> {
    let receta = sqlx::query_as::<_, Receta>("SELECT * FROM recetas WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("receta"))?;
    Ok(receta)
}

/// 随机一篇（"receta de la semana"）
pub async fn receta_aleatoria(pool: &PgPool) -> AppResult<Option<Receta>> {
    let receta = sqlx::query_as::<_, Receta>("SELECT * FROM recetas ORDER BY random() LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(receta)
}

/// 随机菜谱 id（"descubre"）
pub async fn id_aleatorio(pool: &PgPool) -> AppResult<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM recetas ORDER BY random() LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

pub async fn contar_recetas(pool: &PgPool) -> AppResult<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recetas")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// 按收藏数排序的菜谱（热门）
pub async fn populares(
    pool: &PgPool,
    direction: &str,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<RecetaConFavoritos>> {
    let orden = if direction == "asc" {
        "num_favoritos ASC, r.fecha_publicacion DESC"
    } else {
        "num_favoritos DESC, r.fecha_publicacion DESC"
    };
    let sql = format!(
        "SELECT r.*, COUNT(f.id) AS num_favoritos \
         FROM recetas r \
         LEFT JOIN recetas_favoritas f ON f.receta_id = r.id \
         GROUP BY r.id \
         ORDER BY {} \
         LIMIT $1 OFFSET $2",
        orden
    );
    let recetas = sqlx::query_as::<_, RecetaConFavoritos>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(recetas)
}

/// 创建菜谱：菜谱与配料、步骤在同一事务中写入
/// Recipe creation: the recipe and its children are persisted in one transaction
pub async fn crear_receta(pool: &PgPool, autor_id: i64, input: &RecetaInput) -> AppResult<Receta> {
    let mut tx = pool.begin().await?;

    let receta = sqlx::query_as::<_, Receta>(
        "INSERT INTO recetas (titulo, descripcion, autor_id, imagen, tipo, categoria_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(&input.titulo)
    .bind(&input.descripcion)
    .bind(autor_id)
    .bind(&input.imagen)
    .bind(&input.tipo)
    .bind(input.categoria_id)
    .fetch_one(&mut *tx)
    .await?;

    for ingrediente in &input.ingredientes {
        sqlx::query(
            "INSERT INTO ingredientes (receta_id, nombre, cantidad, unidad) VALUES ($1, $2, $3, $4)",
        )
        .bind(receta.id)
        .bind(&ingrediente.nombre)
        .bind(ingrediente.cantidad)
        .bind(&ingrediente.unidad)
        .execute(&mut *tx)
        .await?;
    }

    for paso in &input.pasos {
        sqlx::query("INSERT INTO pasos (receta_id, orden, descripcion) VALUES ($1, $2, $3)")
            .bind(receta.id)
            .bind(paso.orden)
            .bind(&paso.descripcion)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(receta)
}

/// 编辑菜谱：更新主行并整体替换子行，同一事务
pub async fn actualizar_receta(
    pool: &PgPool,
    receta_id: i64,
    input: &RecetaInput,
) -> AppResult<Receta> {
    let mut tx = pool.begin().await?;

    let receta = sqlx::query_as::<_, Receta>(
        "UPDATE recetas SET titulo = $2, descripcion = $3, imagen = $4, tipo = $5, \
         categoria_id = $6 WHERE id = $1 RETURNING *",
    )
    .bind(receta_id)
    .bind(&input.titulo)
    .bind(&input.descripcion)
    .bind(&input.imagen)
    .bind(&input.tipo)
    .bind(input.categoria_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM ingredientes WHERE receta_id = $1")
        .bind(receta_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM pasos WHERE receta_id = $1")
        .bind(receta_id)
        .execute(&mut *tx)
        .await?;

    for ingrediente in &input.ingredientes {
        sqlx::query(
            "INSERT INTO ingredientes (receta_id, nombre, cantidad, unidad) VALUES ($1, $2, $3, $4)",
        )
        .bind(receta_id)
        .bind(&ingrediente.nombre)
        .bind(ingrediente.cantidad)
        .bind(&ingrediente.unidad)
        .execute(&mut *tx)
        .await?;
    }

    for paso in &input.pasos {
        sqlx::query("INSERT INTO pasos (receta_id, orden, descripcion) VALUES ($1, $2, $3)")
            .bind(receta_id)
            .bind(paso.orden)
            .bind(&paso.descripcion)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(receta)
}

pub async fn eliminar_receta(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM recetas WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("receta"));
    }
    Ok(())
}

pub async fn ingredientes_de(pool: &PgPool, receta_id: i64) -> AppResult<Vec<Ingrediente>> {
    let ingredientes = sqlx::query_as::<_, Ingrediente>(
        "SELECT * FROM ingredientes WHERE receta_id = $1 ORDER BY id",
    )
    .bind(receta_id)
    .fetch_all(pool)
    .await?;
    Ok(ingredientes)
}

pub async fn pasos_de(pool: &PgPool, receta_id: i64) -> AppResult<Vec<Paso>> {
    let pasos =
        sqlx::query_as::<_, Paso>("SELECT * FROM pasos WHERE receta_id = $1 ORDER BY orden")
            .bind(receta_id)
            .fetch_all(pool)
            .await?;
    Ok(pasos)
}

// ==================== 搜索 / Search ====================

/// 简单搜索：标题或描述包含关键字
pub async fn buscar_simple(
    pool: &PgPool,
    q: &str,
    order_by: &str,
    direction: &str,
) -> AppResult<Vec<Receta>> {
    let sql = format!(
        "SELECT * FROM recetas \
         WHERE titulo ILIKE $1 OR descripcion ILIKE $1 \
         ORDER BY {}",
        order_clause(order_by, direction)
    );
    let recetas = sqlx::query_as::<_, Receta>(&sql)
        .bind(like_pattern(q))
        .fetch_all(pool)
        .await?;
    Ok(recetas)
}

/// 高级搜索过滤条件
#[derive(Debug, Default, Clone)]
pub struct FiltrosAvanzados {
    pub similar_words: Vec<String>,
    pub exact_phrase: Option<String>,
    pub ingredient: Option<String>,
    pub categoria_id: Option<i64>,
}

/// 高级搜索：词组内 OR，过滤组之间 AND
/// Advanced search: OR within the word group, AND across filter groups
pub async fn buscar_avanzada(
    pool: &PgPool,
    filtros: &FiltrosAvanzados,
) -> AppResult<Vec<Receta>> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT DISTINCT r.* FROM recetas r \
         LEFT JOIN ingredientes i ON i.receta_id = r.id \
         WHERE TRUE",
    );

    if !filtros.similar_words.is_empty() {
        qb.push(" AND (");
        let mut primera = true;
        for word in &filtros.similar_words {
            if !primera {
                qb.push(" OR ");
            }
            primera = false;
            let pattern = like_pattern(word);
            qb.push("r.titulo ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR r.descripcion ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR i.nombre ILIKE ");
            qb.push_bind(pattern);
        }
        qb.push(")");
    }

    if let Some(phrase) = &filtros.exact_phrase {
        let pattern = like_pattern(phrase);
        qb.push(" AND (r.titulo ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR r.descripcion ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(ingredient) = &filtros.ingredient {
        qb.push(
            " AND EXISTS (SELECT 1 FROM ingredientes ing \
             WHERE ing.receta_id = r.id AND ing.nombre ILIKE ",
        );
        qb.push_bind(like_pattern(ingredient));
        qb.push(")");
    }

    if let Some(categoria_id) = filtros.categoria_id {
        qb.push(" AND r.categoria_id = ");
        qb.push_bind(categoria_id);
    }

    qb.push(" ORDER BY r.fecha_publicacion DESC");

    let recetas = qb.build_query_as::<Receta>().fetch_all(pool).await?;
    Ok(recetas)
}

// ==================== 评论 / Comments ====================

/// 某菜谱的全部评论（含作者用户名），时间正序
pub async fn comentarios_de(pool: &PgPool, receta_id: i64) -> AppResult<Vec<ComentarioConAutor>> {
    let comentarios = sqlx::query_as::<_, ComentarioConAutor>(
        "SELECT c.*, u.username AS autor_username \
         FROM comentarios c \
         JOIN usuarios u ON u.id = c.autor_id \
         WHERE c.receta_id = $1 \
         ORDER BY c.fecha_creacion",
    )
    .bind(receta_id)
    .fetch_all(pool)
    .await?;
    Ok(comentarios)
}

pub async fn comentario_por_id(pool: &PgPool, id: i64) -> AppResult<Comentario> {
    let comentario = sqlx::query_as::<_, Comentario>("SELECT * FROM comentarios WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("comentario"))?;
    Ok(comentario)
}

/// 发表评论；回复时父评论必须存在且属于同一菜谱
pub async fn crear_comentario(
    pool: &PgPool,
    receta_id: i64,
    autor_id: i64,
    texto: &str,
    respuesta_a: Option<i64>,
) -> AppResult<Comentario> {
    if let Some(padre_id) = respuesta_a {
        let padre = comentario_por_id(pool, padre_id).await.map_err(|_| {
            AppError::not_found("el comentario al que intentas responder")
        })?;
        if padre.receta_id != receta_id {
            return Err(AppError::not_found(
                "el comentario al que intentas responder",
            ));
        }
    }

    let comentario = sqlx::query_as::<_, Comentario>(
        "INSERT INTO comentarios (receta_id, autor_id, texto, respuesta_a) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(receta_id)
    .bind(autor_id)
    .bind(texto)
    .bind(respuesta_a)
    .fetch_one(pool)
    .await?;
    Ok(comentario)
}

pub async fn actualizar_comentario(pool: &PgPool, id: i64, texto: &str) -> AppResult<Comentario> {
    let comentario = sqlx::query_as::<_, Comentario>(
        "UPDATE comentarios SET texto = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(texto)
    .fetch_one(pool)
    .await?;
    Ok(comentario)
}

pub async fn eliminar_comentario(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM comentarios WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("comentario"));
    }
    Ok(())
}

/// 管理面板的评论列表行
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ComentarioAdmin {
    pub id: i64,
    pub texto: String,
    pub fecha_creacion: chrono::DateTime<chrono::Utc>,
    pub autor_username: String,
    pub receta_id: i64,
    pub receta_titulo: String,
}

/// 全部评论（管理面板），时间倒序
pub async fn comentarios_admin(pool: &PgPool) -> AppResult<Vec<ComentarioAdmin>> {
    let comentarios = sqlx::query_as::<_, ComentarioAdmin>(
        "SELECT c.id, c.texto, c.fecha_creacion, u.username AS autor_username, \
                r.id AS receta_id, r.titulo AS receta_titulo \
         FROM comentarios c \
         JOIN usuarios u ON u.id = c.autor_id \
         JOIN recetas r ON r.id = c.receta_id \
         ORDER BY c.fecha_creacion DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(comentarios)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_whitelist() {
        assert_eq!(order_clause("titulo", "asc"), "titulo ASC");
        assert_eq!(order_clause("titulo", "desc"), "titulo DESC");
        assert_eq!(
            order_clause("fecha_publicacion", "asc"),
            "fecha_publicacion ASC"
        );
        // 未知键或方向回退到默认排序
        assert_eq!(order_clause("autor_id", "asc"), "fecha_publicacion DESC");
        assert_eq!(order_clause("", ""), "fecha_publicacion DESC");
    }

    #[test]
    fn test_like_pattern_escapa_comodines() {
        assert_eq!(like_pattern("tortilla"), "%tortilla%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_filtros_avanzados_default_vacio() {
        let filtros = FiltrosAvanzados::default();
        assert!(filtros.similar_words.is_empty());
        assert!(filtros.exact_phrase.is_none());
        assert!(filtros.ingredient.is_none());
        assert!(filtros.categoria_id.is_none());
    }
}
