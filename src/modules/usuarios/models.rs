use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户账号 / User account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// 用户资料，与用户一对一
/// User profile, 1:1 with the account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Perfil {
    pub id: i64,
    pub user_id: i64,
    pub avatar: Option<String>,
    pub nickname: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub recibir_emails_recetas_nuevas: bool,
    pub recibir_emails_mensajes_privados: bool,
    pub permitir_mensajes_privados: bool,
    pub localidad: Option<String>,
    pub pais: Option<String>,
    pub acerca_de_mi: Option<String>,
    pub mostrar_cumpleanos: bool,
    pub mostrar_edad: bool,
}

impl Perfil {
    /// 根据出生日期计算年龄
    pub fn edad(&self, hoy: NaiveDate) -> Option<i32> {
        self.fecha_nacimiento.map(|nac| calcular_edad(nac, hoy))
    }
}

/// 按出生日期计算整年年龄，生日未到时减一
pub fn calcular_edad(nacimiento: NaiveDate, hoy: NaiveDate) -> i32 {
    let mut edad = hoy.year() - nacimiento.year();
    if (hoy.month(), hoy.day()) < (nacimiento.month(), nacimiento.day()) {
        edad -= 1;
    }
    edad
}

/// 收藏分组（用户自定义标签）
/// User-defined favorite grouping tag
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoriaFavorita {
    pub id: i64,
    pub user_id: i64,
    pub nombre: String,
}

/// 私信 / Private message
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mensaje {
    pub id: i64,
    pub remitente_id: i64,
    pub destinatario_id: i64,
    pub asunto: String,
    pub cuerpo: String,
    pub fecha_envio: DateTime<Utc>,
    pub leido: bool,
}

/// 收藏夹条目（含菜谱摘要列）
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FavoritaResumen {
    pub id: i64,
    pub fecha_agregado: DateTime<Utc>,
    pub categoria_id: Option<i64>,
    pub receta_id: i64,
    pub receta_titulo: String,
    pub receta_imagen: Option<String>,
}

/// 本人评论条目（含菜谱标题）
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ComentarioResumen {
    pub id: i64,
    pub texto: String,
    pub fecha_creacion: DateTime<Utc>,
    pub receta_id: i64,
    pub receta_titulo: String,
}

/// 收件箱会话：对方用户 + 最近一条消息
/// Inbox conversation: counterpart + latest message
#[derive(Debug, Clone, Serialize)]
pub struct Conversacion {
    pub other_user_id: i64,
    pub last_message: Mensaje,
}

/// 将按时间倒序排列的消息折叠为会话列表：
/// 每个对话对象只保留最近一条消息，会话按该消息时间倒序排列
/// Fold messages (newest first) into conversations: one latest message per
/// counterpart, conversations ordered by that message's recency
pub fn agrupar_conversaciones(mensajes: &[Mensaje], mi_id: i64) -> Vec<Conversacion> {
    let mut vistos = std::collections::HashSet::new();
    let mut conversaciones = Vec::new();

    for mensaje in mensajes {
        let other = if mensaje.remitente_id == mi_id {
            mensaje.destinatario_id
        } else {
            mensaje.remitente_id
        };
        if other == mi_id {
            continue;
        }
        if vistos.insert(other) {
            conversaciones.push(Conversacion {
                other_user_id: other,
                last_message: mensaje.clone(),
            });
        }
    }

    conversaciones
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mensaje(id: i64, de: i64, para: i64, ts: i64) -> Mensaje {
        Mensaje {
            id,
            remitente_id: de,
            destinatario_id: para,
            asunto: String::new(),
            cuerpo: format!("mensaje {}", id),
            fecha_envio: Utc.timestamp_opt(ts, 0).unwrap(),
            leido: false,
        }
    }

    #[test]
    fn test_calcular_edad_antes_y_despues_del_cumpleanos() {
        let nacimiento = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();
        // 生日未到
        let antes = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        assert_eq!(calcular_edad(nacimiento, antes), 35);
        // 生日当天
        let mismo = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(calcular_edad(nacimiento, mismo), 36);
    }

    #[test]
    fn test_agrupar_conversaciones_conserva_la_mas_reciente() {
        // 倒序：m4 es lo más reciente
        let mensajes = vec![
            mensaje(4, 2, 1, 400), // con usuario 2
            mensaje(3, 1, 3, 300), // con usuario 3
            mensaje(2, 1, 2, 200), // con usuario 2 (más viejo, se descarta)
            mensaje(1, 3, 1, 100), // con usuario 3 (más viejo, se descarta)
        ];

        let conversaciones = agrupar_conversaciones(&mensajes, 1);
        assert_eq!(conversaciones.len(), 2);
        assert_eq!(conversaciones[0].other_user_id, 2);
        assert_eq!(conversaciones[0].last_message.id, 4);
        assert_eq!(conversaciones[1].other_user_id, 3);
        assert_eq!(conversaciones[1].last_message.id, 3);
    }

    #[test]
    fn test_agrupar_conversaciones_ignora_mensajes_a_si_mismo() {
        let mensajes = vec![mensaje(1, 1, 1, 100)];
        assert!(agrupar_conversaciones(&mensajes, 1).is_empty());
    }
}
