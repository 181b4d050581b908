pub mod favoritos;
pub mod mensajes;
pub mod perfil;
