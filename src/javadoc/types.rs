/// Member visibility token. Only `Public` members make it into the rendered
/// documentation; the rest are parsed and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn from_token(token: &str) -> Self {
        match token {
            "public" => Self::Public,
            "protected" => Self::Protected,
            _ => Self::Private,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

impl ClassKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "interface" => Self::Interface,
            "enum" => Self::Enum,
            _ => Self::Class,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
        }
    }
}

/// A method signature with its preceding documentation block, if any.
#[derive(Debug, Clone)]
pub struct JavaMethod {
    pub visibility: Visibility,
    pub return_type: String,
    pub name: String,
    pub parameters: String,
    pub doc: String,
}

/// A field declaration with its preceding documentation block, if any.
#[derive(Debug, Clone)]
pub struct JavaField {
    pub visibility: Visibility,
    pub field_type: String,
    pub name: String,
    pub doc: String,
}

/// Transient record of one parsed source file; discarded once the
/// corresponding Markdown file is written.
#[derive(Debug, Clone)]
pub struct JavaClass {
    pub package: Option<String>,
    pub kind: ClassKind,
    pub name: String,
    pub doc: String,
    pub methods: Vec<JavaMethod>,
    pub fields: Vec<JavaField>,
}

impl JavaClass {
    pub fn public_methods(&self) -> impl Iterator<Item = &JavaMethod> {
        self.methods
            .iter()
            .filter(|m| m.visibility == Visibility::Public)
    }

    pub fn public_fields(&self) -> impl Iterator<Item = &JavaField> {
        self.fields
            .iter()
            .filter(|f| f.visibility == Visibility::Public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_token() {
        assert_eq!(Visibility::from_token("public"), Visibility::Public);
        assert_eq!(Visibility::from_token("protected"), Visibility::Protected);
        assert_eq!(Visibility::from_token("private"), Visibility::Private);
    }

    #[test]
    fn test_class_kind_round_trip() {
        assert_eq!(ClassKind::from_token("interface"), ClassKind::Interface);
        assert_eq!(ClassKind::from_token("enum").as_str(), "enum");
        assert_eq!(ClassKind::from_token("class").as_str(), "class");
    }
}
