pub mod admin;
pub mod busqueda;
pub mod categorias;
pub mod comentarios;
pub mod paginas;
pub mod recetas;
