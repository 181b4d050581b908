use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::{sa_check_login, sa_check_role, sa_ignore, LoginIdExtractor};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::current_user_id;
use crate::comm::pagination::{build_link_header, paginate};
use crate::error::AppError;
use crate::modules::recetas::models::{armar_hilos, RecetaInput};
use crate::modules::recetas::repo;
use crate::modules::usuarios::repo as usuarios_repo;

/// 列表页查询参数
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub categoria: Option<String>,
    pub order_by: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopularesQuery {
    pub page: Option<String>,
    pub direction: Option<String>,
}

/// 当前用户已收藏的菜谱 id（未登录时为空）
async fn favoritas_del_usuario(
    pool: &PgPool,
    login_id: &Option<LoginIdExtractor>,
) -> Vec<i64> {
    if let Some(login) = login_id {
        if let Ok(uid) = current_user_id(login) {
            return usuarios_repo::ids_favoritas(pool, uid).await.unwrap_or_default();
        }
    }
    Vec::new()
}

/// 首页列表：可选分类过滤 + 排序，附带侧栏分类、本周推荐与热门菜谱
#[actix_web::get("/recetas")]
#[sa_ignore]
pub async fn home(
    pool: web::Data<PgPool>,
    query: web::Query<HomeQuery>,
    login_id: Option<LoginIdExtractor>,
) -> Result<impl Responder> {
    let categorias = repo::listar_categorias(&pool).await?;

    // 分类过滤：slug 未知时返回空列表并标记未找到
    let mut filtro_aplicado = false;
    let mut categoria_encontrada = true;
    let mut categoria_nombre: Option<String> = None;
    let mut categoria_id: Option<i64> = None;

    if let Some(slug) = query.categoria.as_deref() {
        filtro_aplicado = true;
        match repo::categoria_por_slug(&pool, slug).await? {
            Some(categoria) => {
                categoria_nombre = Some(categoria.nombre.clone());
                categoria_id = Some(categoria.id);
            }
            None => categoria_encontrada = false,
        }
    }

    let order_by = query.order_by.as_deref().unwrap_or("fecha_publicacion");
    let direction = query.direction.as_deref().unwrap_or("desc");

    let recetas = if filtro_aplicado && !categoria_encontrada {
        Vec::new()
    } else {
        repo::listar_recetas(&pool, categoria_id, order_by, direction).await?
    };

    let receta_de_la_semana = repo::receta_aleatoria(&pool).await?;
    let recetas_populares = repo::populares(&pool, "desc", 6, 0).await?;
    let favoritas_ids = favoritas_del_usuario(&pool, &login_id).await;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "recetas": recetas,
            "categorias": categorias,
            "filtro_categoria_aplicado": filtro_aplicado,
            "categoria_encontrada": categoria_encontrada,
            "categoria_nombre": categoria_nombre,
            "current_order_by": order_by,
            "current_direction": direction,
            "receta_de_la_semana": receta_de_la_semana,
            "recetas_populares": recetas_populares,
            "favoritas_ids": favoritas_ids,
        }
    })))
}

/// 热门菜谱页：按收藏数排序 + 分页
#[actix_web::get("/recetas/populares")]
#[sa_ignore]
pub async fn populares(
    pool: web::Data<PgPool>,
    query: web::Query<PopularesQuery>,
    login_id: Option<LoginIdExtractor>,
) -> Result<impl Responder> {
    let direction = query.direction.as_deref().unwrap_or("desc");

    let total = repo::contar_recetas(&pool).await? as u64;
    let pagina = paginate(query.page.as_deref(), 12, total);

    let recetas =
        repo::populares(&pool, direction, pagina.limit(), pagina.offset()).await?;
    let favoritas_ids = favoritas_del_usuario(&pool, &login_id).await;

    let link = build_link_header("/recetas/populares", &pagina);
    Ok(HttpResponse::Ok()
        .insert_header(("Link", link))
        .json(json!({
            "code": 0,
            "message": "success",
            "data": {
                "recetas_populares": recetas,
                "pagina": pagina,
                "favoritas_ids": favoritas_ids,
                "current_order_by": "populares",
                "current_direction": direction,
            }
        })))
}

/// 菜谱详情：主行 + 配料 + 步骤 + 评论线程
#[actix_web::get("/recetas/{id}")]
#[sa_ignore]
pub async fn detalle(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: Option<LoginIdExtractor>,
) -> Result<impl Responder> {
    let receta_id = path.into_inner();
    let receta = repo::receta_por_id(&pool, receta_id).await?;
    let ingredientes = repo::ingredientes_de(&pool, receta_id).await?;
    let pasos = repo::pasos_de(&pool, receta_id).await?;
    let comentarios = armar_hilos(repo::comentarios_de(&pool, receta_id).await?);

    let mut es_favorita = false;
    if let Some(login) = &login_id {
        if let Ok(uid) = current_user_id(login) {
            es_favorita = usuarios_repo::es_favorita(&pool, uid, receta_id).await?;
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "receta": receta,
            "ingredientes": ingredientes,
            "pasos": pasos,
            "comentarios_principales": comentarios,
            "es_favorita": es_favorita,
        }
    })))
}

/// 创建菜谱（仅管理员）：菜谱与子行一并保存
#[actix_web::post("/recetas")]
#[sa_check_role("admin")]
pub async fn crear(
    pool: web::Data<PgPool>,
    login_id: LoginIdExtractor,
    input: web::Json<RecetaInput>,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    input.validar()?;

    let receta = repo::crear_receta(&pool, uid, &input).await?;
    tracing::info!("✅ 菜谱 {} 创建成功 (autor: {})", receta.id, uid);

    Ok(HttpResponse::Created().json(json!({
        "code": 0,
        "message": "receta creada",
        "data": receta
    })))
}

/// 作者或超级用户才可修改/删除
async fn comprobar_autor_o_superuser(
    pool: &PgPool,
    uid: i64,
    autor_id: i64,
) -> Result<(), AppError> {
    if autor_id == uid {
        return Ok(());
    }
    let usuario = usuarios_repo::buscar_por_id(pool, uid).await?;
    if usuario.is_superuser {
        return Ok(());
    }
    Err(AppError::permission(
        "no tienes permiso para modificar esta receta",
    ))
}

/// 编辑菜谱（仅管理员，且作者或超级用户）
#[actix_web::put("/recetas/{id}")]
#[sa_check_role("admin")]
pub async fn editar(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
    input: web::Json<RecetaInput>,
) -> Result<impl Responder> {
    let receta_id = path.into_inner();
    let uid = current_user_id(&login_id)?;
    let receta = repo::receta_por_id(&pool, receta_id).await?;
    comprobar_autor_o_superuser(&pool, uid, receta.autor_id).await?;

    input.validar()?;
    let actualizada = repo::actualizar_receta(&pool, receta_id, &input).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "receta actualizada",
        "data": actualizada
    })))
}

/// 删除菜谱（仅管理员，且作者或超级用户）
#[actix_web::delete("/recetas/{id}")]
#[sa_check_role("admin")]
pub async fn eliminar(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let receta_id = path.into_inner();
    let uid = current_user_id(&login_id)?;
    let receta = repo::receta_por_id(&pool, receta_id).await?;
    comprobar_autor_o_superuser(&pool, uid, receta.autor_id).await?;

    repo::eliminar_receta(&pool, receta_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "receta eliminada",
        "data": null
    })))
}

/// 预览：校验载荷并原样返回，不持久化
#[actix_web::post("/recetas/previsualizar")]
#[sa_check_login]
pub async fn previsualizar(
    pool: web::Data<PgPool>,
    input: web::Json<RecetaInput>,
) -> Result<impl Responder> {
    input.validar()?;

    // 分类无效时置空（预览不报错）
    let categoria = match input.categoria_id {
        Some(id) => sqlx::query_as::<_, crate::modules::recetas::models::Categoria>(
            "SELECT * FROM categorias WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(AppError::from)?,
        None => None,
    };

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "receta": input.into_inner(),
            "categoria": categoria,
            "is_preview": true,
        }
    })))
}

/// 随机发现一篇菜谱
#[actix_web::get("/recetas/descubre")]
#[sa_ignore]
pub async fn descubre(pool: web::Data<PgPool>) -> Result<impl Responder> {
    match repo::id_aleatorio(&pool).await? {
        Some(id) => Ok(HttpResponse::Ok().json(json!({
            "code": 0,
            "message": "success",
            "data": { "receta_id": id }
        }))),
        None => Ok(HttpResponse::Ok().json(json!({
            "code": 0,
            "message": "no hay recetas disponibles para descubrir",
            "data": null
        }))),
    }
}

/// 按分类列出菜谱（slug 未知时 404）
#[actix_web::get("/recetas/categoria/{slug}")]
#[sa_ignore]
pub async fn por_categoria(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    login_id: Option<LoginIdExtractor>,
) -> Result<impl Responder> {
    let slug = path.into_inner();
    let categoria = repo::categoria_por_slug(&pool, &slug)
        .await?
        .ok_or_else(|| AppError::not_found("categoría"))?;

    let recetas =
        repo::listar_recetas(&pool, Some(categoria.id), "fecha_publicacion", "desc").await?;
    let categorias = repo::listar_categorias(&pool).await?;
    let favoritas_ids = favoritas_del_usuario(&pool, &login_id).await;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "categoria_actual": categoria,
            "recetas": recetas,
            "categorias": categorias,
            "favoritas_ids": favoritas_ids,
        }
    })))
}
