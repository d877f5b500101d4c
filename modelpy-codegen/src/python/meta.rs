//! Metadata tag resolution.
//!
//! Translates model-level metadata annotations into the runtime tag
//! strings checked by the serializer/validator pair on each field, and
//! into the class-level `_ALLOWED_METADATA` set.

use modelpy_model::MetaTag;

use crate::error::CodegenError;

/// Resolved metadata for one attribute.
#[derive(Debug, Clone, Default)]
pub struct MetaProfile {
    /// Tags accepted by the field validator, in emission order.
    pub tags: Vec<&'static str>,
    /// True when the attribute may alternatively hold a reference, which
    /// widens the annotated type with `| BaseReference`.
    pub has_reference: bool,
}

impl MetaProfile {
    /// True when the attribute carries no metadata at all.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.tags.is_empty() && !self.has_reference
    }

    /// Renders the tag tuple passed to the validator, e.g.
    /// `('@key', '@key:external')`.
    #[must_use]
    pub fn tag_tuple(&self) -> String {
        let quoted: Vec<String> = self.tags.iter().map(|t| format!("'{t}'")).collect();
        // A one-element tuple literal needs the trailing comma.
        if quoted.len() == 1 {
            format!("({}, )", quoted[0])
        } else {
            format!("({})", quoted.join(", "))
        }
    }

    /// Unions the key tags in, ahead of any reference tags. Used when a
    /// reference attribute targets a keyed type.
    pub fn union_key_tags(&mut self) {
        let mut tags = vec!["@key", "@key:external"];
        for tag in &self.tags {
            if !tags.contains(tag) {
                tags.push(tag);
            }
        }
        self.tags = tags;
    }
}

/// Resolves the metadata tags declared on an attribute.
///
/// Scheme is always ordered last so that key/reference constraint checks
/// can slice it off.
///
/// # Errors
/// Returns `CodegenError::UnsupportedConstruct` for a tag that has no
/// attribute-level meaning.
pub fn resolve_attribute_meta(
    tags: &[MetaTag],
    path: &str,
) -> Result<MetaProfile, CodegenError> {
    let mut profile = MetaProfile::default();
    let mut scheme = false;
    for tag in tags {
        match tag {
            MetaTag::Key | MetaTag::KeyExternal | MetaTag::Id => {
                push_tag(&mut profile.tags, "@key");
                push_tag(&mut profile.tags, "@key:external");
            }
            MetaTag::Reference | MetaTag::ReferenceExternal => {
                push_tag(&mut profile.tags, "@ref");
                push_tag(&mut profile.tags, "@ref:external");
                profile.has_reference = true;
            }
            MetaTag::Location => push_tag(&mut profile.tags, "@key:scoped"),
            MetaTag::Address => {
                push_tag(&mut profile.tags, "@ref:scoped");
                profile.has_reference = true;
            }
            MetaTag::Scheme => scheme = true,
            MetaTag::Scoped => {
                return Err(CodegenError::unsupported("metadata tag 'scoped'", path));
            }
        }
    }
    if scheme {
        push_tag(&mut profile.tags, "@scheme");
    }
    Ok(profile)
}

/// Resolves class-level metadata into the `_ALLOWED_METADATA` tag set.
///
/// # Errors
/// Returns `CodegenError::UnsupportedConstruct` for a tag that has no
/// class-level meaning.
pub fn resolve_class_meta(tags: &[MetaTag], path: &str) -> Result<Vec<&'static str>, CodegenError> {
    let mut allowed = Vec::new();
    for tag in tags {
        match tag {
            MetaTag::Key | MetaTag::KeyExternal | MetaTag::Id => {
                push_tag(&mut allowed, "@key");
                push_tag(&mut allowed, "@key:external");
            }
            MetaTag::Scheme => push_tag(&mut allowed, "@scheme"),
            other => {
                return Err(CodegenError::unsupported(
                    format!("class-level metadata tag {other:?}"),
                    path,
                ));
            }
        }
    }
    Ok(allowed)
}

fn push_tag(tags: &mut Vec<&'static str>, tag: &'static str) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}
