use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failure reported by a [`Document`](crate::traits::Document) gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("elemento no encontrado: {0}")]
    NotFound(String),

    #[error("búsqueda de elemento no soportada: {0}")]
    Unsupported(String),

    #[error("error de protocolo del navegador: {0}")]
    Protocol(String),
}

/// Step of a run in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Search,
    ResultCount,
    RowTemplate,
    Pagination,
    OpenDetail,
    Extract,
    ReturnToList,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "la configuración",
            Phase::Search => "la búsqueda",
            Phase::ResultCount => "el conteo de resultados",
            Phase::RowTemplate => "la plantilla de fila",
            Phase::Pagination => "la paginación",
            Phase::OpenDetail => "la apertura del detalle",
            Phase::Extract => "la extracción",
            Phase::ReturnToList => "el regreso al listado",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`ScraperError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Setup,
    Precondition,
    Navigation,
    Extraction,
    Io,
}

impl From<Phase> for ErrorKind {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Setup => ErrorKind::Setup,
            Phase::Search | Phase::ResultCount | Phase::RowTemplate => ErrorKind::Precondition,
            Phase::Pagination | Phase::ReturnToList => ErrorKind::Navigation,
            Phase::OpenDetail | Phase::Extract => ErrorKind::Extraction,
        }
    }
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("falló la inicialización del navegador: {0}")]
    BrowserInit(String),

    #[error("precondición no cumplida en {phase}: {detail}")]
    Precondition { phase: Phase, detail: String },

    #[error("no se pudo llegar a la página {target_page}: {detail}")]
    Navigation { target_page: usize, detail: String },

    #[error("registro {index}: no se pudo leer {field}: {detail}")]
    Extraction {
        index: usize,
        field: &'static str,
        detail: String,
    },

    #[error("tiempo agotado tras {waited:?} en {phase} esperando {selector}")]
    Timeout {
        phase: Phase,
        selector: String,
        waited: Duration,
    },

    #[error("falló {phase}: {source}")]
    Driver {
        phase: Phase,
        #[source]
        source: DriverError,
    },

    #[error("error de archivo: {0}")]
    FileIO(#[from] std::io::Error),
}

impl ScraperError {
    pub fn precondition(phase: Phase, detail: impl Into<String>) -> Self {
        ScraperError::Precondition {
            phase,
            detail: detail.into(),
        }
    }

    pub fn navigation(target_page: usize, detail: impl fmt::Display) -> Self {
        ScraperError::Navigation {
            target_page,
            detail: detail.to_string(),
        }
    }

    pub fn extraction(index: usize, field: &'static str, detail: impl fmt::Display) -> Self {
        ScraperError::Extraction {
            index,
            field,
            detail: detail.to_string(),
        }
    }

    pub fn driver(phase: Phase) -> impl FnOnce(DriverError) -> Self {
        move |source| ScraperError::Driver { phase, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScraperError::BrowserInit(_) => ErrorKind::Setup,
            ScraperError::Precondition { .. } => ErrorKind::Precondition,
            ScraperError::Navigation { .. } => ErrorKind::Navigation,
            ScraperError::Extraction { .. } => ErrorKind::Extraction,
            ScraperError::Timeout { phase, .. } | ScraperError::Driver { phase, .. } => {
                ErrorKind::from(*phase)
            }
            ScraperError::FileIO(_) => ErrorKind::Io,
        }
    }
}
