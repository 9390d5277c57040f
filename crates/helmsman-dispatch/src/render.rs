//! Output rendering abstraction.
//!
//! Dispatch doesn't know about templates or tables. For structured output
//! it only knows that something turns a `serde_json::Value` into text.

/// Turns handler data into text.
pub trait Render {
    fn render(&self, data: &serde_json::Value) -> Result<String, RenderError>;
}

impl<F> Render for F
where
    F: Fn(&serde_json::Value) -> Result<String, RenderError>,
{
    fn render(&self, data: &serde_json::Value) -> Result<String, RenderError> {
        self(data)
    }
}

/// Errors that can occur during rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        RenderError::Serialization(e.to_string())
    }
}

/// The default renderer: JSON, pretty-printed unless asked otherwise.
#[derive(Debug, Clone, Copy)]
pub struct JsonRender {
    pretty: bool,
}

impl JsonRender {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonRender {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Render for JsonRender {
    fn render(&self, data: &serde_json::Value) -> Result<String, RenderError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_render_pretty_and_compact() {
        let data = json!({"name": "test"});
        assert!(JsonRender::default()
            .render(&data)
            .unwrap()
            .contains("\"name\": \"test\""));
        assert_eq!(
            JsonRender::compact().render(&data).unwrap(),
            r#"{"name":"test"}"#
        );
    }

    #[test]
    fn closures_are_renderers() {
        let upper = |data: &serde_json::Value| -> Result<String, RenderError> {
            data.as_str()
                .map(str::to_uppercase)
                .ok_or_else(|| RenderError::Render("expected a string".into()))
        };
        assert_eq!(upper.render(&json!("hi")).unwrap(), "HI");
        assert!(upper.render(&json!(1)).is_err());
    }
}
