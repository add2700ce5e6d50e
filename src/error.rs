pub type PaintshopResult<T> = Result<T, PaintshopError>;

#[derive(thiserror::Error, Debug)]
pub enum PaintshopError {
    #[error("config error: {0}")]
    Config(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("mutation error: {0}")]
    Mutation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PaintshopError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn mutation(msg: impl Into<String>) -> Self {
        Self::Mutation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PaintshopError::config("x")
                .to_string()
                .contains("config error:")
        );
        assert!(
            PaintshopError::backend("x")
                .to_string()
                .contains("backend error:")
        );
        assert!(
            PaintshopError::mutation("x")
                .to_string()
                .contains("mutation error:")
        );
        assert!(
            PaintshopError::render("x")
                .to_string()
                .contains("render error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PaintshopError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
