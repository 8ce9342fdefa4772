//! Boundary checks shared by the write operations. Each returns the
//! normalized value or `InvalidArgument`.

use curio_types::api::{NewProduct, ProductPatch};
use url::Url;

use crate::error::{CoreError, CoreResult};

pub const MAX_COMMENT_LEN: usize = 2000;
pub const MAX_TITLE_LEN: usize = 200;
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=32;

pub fn required(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub fn http_url(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = required(field, value)?;
    let parsed = Url::parse(&trimmed)
        .map_err(|e| CoreError::invalid(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::invalid(format!("{field} must be an http(s) URL")));
    }
    Ok(trimmed)
}

/// Trims entries, drops empty ones and removes duplicates, keeping the first
/// occurrence's position.
pub fn materials(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !out.iter().any(|m| m == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

pub fn comment_content(value: &str) -> CoreResult<String> {
    let content = required("content", value)?;
    if content.chars().count() > MAX_COMMENT_LEN {
        return Err(CoreError::invalid(format!(
            "content exceeds {MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(content)
}

pub fn username(value: &str) -> CoreResult<String> {
    let name = value.trim();
    if !USERNAME_LEN.contains(&name.chars().count()) {
        return Err(CoreError::invalid(format!(
            "username must be {} to {} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        )));
    }
    Ok(name.to_string())
}

/// Empty input clears the field.
pub fn optional_email(value: Option<&str>) -> CoreResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(email) if email.contains('@') && !email.starts_with('@') && !email.ends_with('@') => {
            Ok(Some(email.to_string()))
        }
        Some(_) => Err(CoreError::invalid("email is not valid")),
    }
}

pub fn optional_url(field: &str, value: Option<&str>) -> CoreResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) => http_url(field, url).map(Some),
    }
}

fn title(value: &str) -> CoreResult<String> {
    let title = required("title", value)?;
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::invalid(format!("title exceeds {MAX_TITLE_LEN} characters")));
    }
    Ok(title)
}

/// Normalizes a full product payload on create.
pub fn product(input: &NewProduct) -> CoreResult<NewProduct> {
    Ok(NewProduct {
        title: title(&input.title)?,
        company_name: required("company_name", &input.company_name)?,
        link: http_url("link", &input.link)?,
        image_url: http_url("image_url", &input.image_url)?,
        description: input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        country: required("country", &input.country)?,
        materials: materials(&input.materials),
        collection: required("collection", &input.collection)?,
    })
}

/// Normalizes each field a patch sets, with the same rules as create. A
/// blank description stays as an empty string, which clears it.
pub fn product_patch(patch: &ProductPatch) -> CoreResult<ProductPatch> {
    Ok(ProductPatch {
        title: patch.title.as_deref().map(title).transpose()?,
        company_name: patch
            .company_name
            .as_deref()
            .map(|v| required("company_name", v))
            .transpose()?,
        link: patch.link.as_deref().map(|v| http_url("link", v)).transpose()?,
        image_url: patch
            .image_url
            .as_deref()
            .map(|v| http_url("image_url", v))
            .transpose()?,
        description: patch.description.as_deref().map(|d| d.trim().to_string()),
        country: patch.country.as_deref().map(|v| required("country", v)).transpose()?,
        materials: patch.materials.as_deref().map(materials),
        collection: patch
            .collection
            .as_deref()
            .map(|v| required("collection", v))
            .transpose()?,
    })
}
