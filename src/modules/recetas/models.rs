use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// 菜谱分类 / Recipe category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
    pub slug: String,
}

/// 菜谱 / Recipe
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receta {
    pub id: i64,
    pub titulo: String,
    pub descripcion: String,
    pub fecha_publicacion: DateTime<Utc>,
    pub autor_id: i64,
    pub imagen: Option<String>,
    pub tipo: Option<String>,
    pub categoria_id: Option<i64>,
}

/// 菜谱 + 收藏数（热门列表）
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecetaConFavoritos {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub receta: Receta,
    pub num_favoritos: i64,
}

/// 配料 / Ingredient
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingrediente {
    pub id: i64,
    pub receta_id: i64,
    pub nombre: String,
    pub cantidad: f64,
    pub unidad: String,
}

/// 步骤 / Step
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Paso {
    pub id: i64,
    pub receta_id: i64,
    pub orden: i32,
    pub descripcion: String,
}

/// 评论 / Comment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comentario {
    pub id: i64,
    pub receta_id: i64,
    pub autor_id: i64,
    pub texto: String,
    pub fecha_creacion: DateTime<Utc>,
    pub respuesta_a: Option<i64>,
}

/// 评论 + 作者用户名（详情页展示）
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ComentarioConAutor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comentario: Comentario,
    pub autor_username: String,
}

/// 顶层评论及其回复
#[derive(Debug, Clone, Serialize)]
pub struct ComentarioHilo {
    #[serde(flatten)]
    pub comentario: ComentarioConAutor,
    pub respuestas: Vec<ComentarioConAutor>,
}

/// 把按时间正序排列的评论整理成顶层评论 + 回复的结构。
/// 回复指向的父评论不在列表中时该回复被丢弃（父评论已删除时级联删除，正常不会发生）。
pub fn armar_hilos(comentarios: Vec<ComentarioConAutor>) -> Vec<ComentarioHilo> {
    let mut hilos: Vec<ComentarioHilo> = Vec::new();
    let mut indice: std::collections::HashMap<i64, usize> = std::collections::HashMap::new();

    for comentario in comentarios {
        match comentario.comentario.respuesta_a {
            None => {
                indice.insert(comentario.comentario.id, hilos.len());
                hilos.push(ComentarioHilo {
                    comentario,
                    respuestas: Vec::new(),
                });
            }
            Some(padre) => {
                if let Some(&pos) = indice.get(&padre) {
                    hilos[pos].respuestas.push(comentario);
                }
            }
        }
    }

    hilos
}

// ==================== 表单输入 / Form inputs ====================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngredienteInput {
    pub nombre: String,
    pub cantidad: f64,
    pub unidad: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasoInput {
    pub orden: i32,
    pub descripcion: String,
}

/// 菜谱创建/编辑的载荷：菜谱 + 子行一起提交
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecetaInput {
    pub titulo: String,
    pub descripcion: String,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(default)]
    pub categoria_id: Option<i64>,
    #[serde(default)]
    pub ingredientes: Vec<IngredienteInput>,
    #[serde(default)]
    pub pasos: Vec<PasoInput>,
}

impl RecetaInput {
    /// 表单校验，逐字段报错
    pub fn validar(&self) -> AppResult<()> {
        if self.titulo.trim().is_empty() {
            return Err(AppError::validation("titulo", "el título es obligatorio"));
        }
        if self.titulo.len() > 200 {
            return Err(AppError::validation("titulo", "máximo 200 caracteres"));
        }
        if self.descripcion.trim().is_empty() {
            return Err(AppError::validation(
                "descripcion",
                "la descripción es obligatoria",
            ));
        }
        for (i, ingrediente) in self.ingredientes.iter().enumerate() {
            if ingrediente.nombre.trim().is_empty() {
                return Err(AppError::validation(
                    format!("ingredientes[{}].nombre", i),
                    "el nombre es obligatorio",
                ));
            }
            if ingrediente.cantidad <= 0.0 {
                return Err(AppError::validation(
                    format!("ingredientes[{}].cantidad", i),
                    "la cantidad debe ser positiva",
                ));
            }
        }
        for (i, paso) in self.pasos.iter().enumerate() {
            if paso.orden < 1 {
                return Err(AppError::validation(
                    format!("pasos[{}].orden", i),
                    "el orden debe ser positivo",
                ));
            }
            if paso.descripcion.trim().is_empty() {
                return Err(AppError::validation(
                    format!("pasos[{}].descripcion", i),
                    "la descripción es obligatoria",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn comentario(id: i64, respuesta_a: Option<i64>, ts: i64) -> ComentarioConAutor {
        ComentarioConAutor {
            comentario: Comentario {
                id,
                receta_id: 1,
                autor_id: 1,
                texto: format!("comentario {}", id),
                fecha_creacion: Utc.timestamp_opt(ts, 0).unwrap(),
                respuesta_a,
            },
            autor_username: "ana".to_string(),
        }
    }

    fn input_valido() -> RecetaInput {
        RecetaInput {
            titulo: "Tortilla de patatas".to_string(),
            descripcion: "La clásica".to_string(),
            tipo: None,
            imagen: None,
            categoria_id: None,
            ingredientes: vec![IngredienteInput {
                nombre: "Patata".to_string(),
                cantidad: 3.0,
                unidad: "unidades".to_string(),
            }],
            pasos: vec![PasoInput {
                orden: 1,
                descripcion: "Pelar las patatas".to_string(),
            }],
        }
    }

    #[test]
    fn test_armar_hilos_agrupa_respuestas() {
        let comentarios = vec![
            comentario(1, None, 100),
            comentario(2, Some(1), 200),
            comentario(3, None, 300),
            comentario(4, Some(1), 400),
        ];

        let hilos = armar_hilos(comentarios);
        assert_eq!(hilos.len(), 2);
        assert_eq!(hilos[0].comentario.comentario.id, 1);
        assert_eq!(hilos[0].respuestas.len(), 2);
        assert_eq!(hilos[0].respuestas[1].comentario.id, 4);
        assert!(hilos[1].respuestas.is_empty());
    }

    #[test]
    fn test_armar_hilos_descarta_respuesta_huerfana() {
        let hilos = armar_hilos(vec![comentario(2, Some(99), 100)]);
        assert!(hilos.is_empty());
    }

    #[test]
    fn test_receta_input_valido() {
        assert!(input_valido().validar().is_ok());
    }

    #[test]
    fn test_receta_input_sin_titulo() {
        let mut input = input_valido();
        input.titulo = "  ".to_string();
        assert!(input.validar().is_err());
    }

    #[test]
    fn test_receta_input_cantidad_negativa() {
        let mut input = input_valido();
        input.ingredientes[0].cantidad = -1.0;
        assert!(input.validar().is_err());
    }

    #[test]
    fn test_receta_input_orden_invalido() {
        let mut input = input_valido();
        input.pasos[0].orden = 0;
        assert!(input.validar().is_err());
    }
}
