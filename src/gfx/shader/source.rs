use std::borrow::Cow;

/// Program text plus the names the program exposes.
///
/// `vertex` and `fragment` are opaque to the engine; only the backend reads
/// them. Attribute slots are assigned by position in `attributes`, and each
/// sampler reads from the texture unit matching its position in `samplers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub name: Cow<'static, str>,
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
    pub attributes: Vec<Cow<'static, str>>,
    pub uniforms: Vec<Cow<'static, str>>,
    pub samplers: Vec<Cow<'static, str>>,
}

impl ShaderSource {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
            attributes: Vec::new(),
            uniforms: Vec::new(),
            samplers: Vec::new(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uniforms<I, S>(mut self, uniforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.uniforms = uniforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_samplers<I, S>(mut self, samplers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.samplers = samplers.into_iter().map(Into::into).collect();
        self
    }

    /// Texture unit a sampler reads from
    pub fn sampler_unit(&self, name: &str) -> Option<u32> {
        self.samplers
            .iter()
            .position(|s| s == name)
            .map(|unit| unit as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let source = ShaderSource::new("mix", "vs", "fs")
            .with_attributes(["a_Position", "a_TexCoordinate"])
            .with_uniforms(["u_MVPMatrix"])
            .with_samplers(["u_Texture", "u_Texture2"]);

        assert_eq!(source.attributes[1], "a_TexCoordinate");
        assert_eq!(source.sampler_unit("u_Texture2"), Some(1));
        assert_eq!(source.sampler_unit("u_AlphaTexture"), None);
    }

    #[test]
    fn test_owned_text_is_accepted() {
        let fragment = String::from("fn fs_main() {}");
        let source = ShaderSource::new(String::from("custom"), "vs", fragment);
        assert!(matches!(source.fragment, Cow::Owned(_)));
    }
}
