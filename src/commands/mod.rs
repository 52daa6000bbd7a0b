//! Built-in bot commands — instant responses, no extraction.

pub mod search;


/// Known bot commands.
pub enum Command {
    Buscar,
    Menu,
    Ayuda,
}

impl Command {
    /// Parse a command from message text. Returns `None` for anything that
    /// is not a recognized `/` prefix, which flows on to the extraction
    /// pipeline.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        match first.to_lowercase().as_str() {
            "/buscar" => Some(Self::Buscar),
            "/menu" => Some(Self::Menu),
            "/ayuda" => Some(Self::Ayuda),
            _ => None,
        }
    }
}

/// Usage text for `/menu` and `/ayuda`.
pub fn help_text() -> &'static str {
    "*Corredor* — registro de propiedades\n\n\
     Envíame la descripción de una propiedad (ej: \"vendo depto en Providencia, \
     2D 1B, 600 lucas\") y la guardo en la planilla.\n\n\
     Comandos:\n\
     /buscar <qué buscas> — busca en las propiedades registradas\n\
     /menu — este mensaje\n\
     /ayuda — este mensaje"
}
