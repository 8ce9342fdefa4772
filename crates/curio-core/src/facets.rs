//! Category facets: counts and filters over the live product set. Recomputed
//! on every read, never stored.

use std::collections::{BTreeSet, HashMap};

use curio_db::Database;
use curio_types::models::{FacetCount, Product, Taxonomy};
use tracing::debug;

use crate::error::CoreResult;
use crate::products::list_products;

/// Number of products per taxonomy value, highest count first, ties broken
/// by value. Values with no products never appear.
pub fn compute_facet_counts(products: &[Product], taxonomy: Taxonomy) -> Vec<FacetCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for product in products {
        match taxonomy {
            Taxonomy::Materials => {
                let distinct: BTreeSet<&str> = product.materials.iter().map(String::as_str).collect();
                for material in distinct {
                    *counts.entry(material).or_default() += 1;
                }
            }
            Taxonomy::Countries => *counts.entry(product.country.as_str()).or_default() += 1,
            Taxonomy::Collections => *counts.entry(product.collection.as_str()).or_default() += 1,
        }
    }

    let mut out: Vec<FacetCount> = counts
        .into_iter()
        .map(|(value, count)| FacetCount {
            value: value.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    out
}

/// Products in the given facet bucket. Featured products come first, and
/// each group is ordered newest first.
pub fn filter_products_by_facet(
    products: &[Product],
    taxonomy: Taxonomy,
    value: &str,
) -> Vec<Product> {
    let mut out: Vec<Product> = products
        .iter()
        .filter(|p| match taxonomy {
            Taxonomy::Materials => p.materials.iter().any(|m| m == value),
            Taxonomy::Countries => p.country == value,
            Taxonomy::Collections => p.collection == value,
        })
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
    out
}

pub fn facet_counts(db: &Database, taxonomy: Taxonomy) -> CoreResult<Vec<FacetCount>> {
    let counts = compute_facet_counts(&list_products(db)?, taxonomy);
    debug!("{} facet: {} distinct values", taxonomy, counts.len());
    Ok(counts)
}

pub fn products_by_facet(db: &Database, taxonomy: Taxonomy, value: &str) -> CoreResult<Vec<Product>> {
    let products = filter_products_by_facet(&list_products(db)?, taxonomy, value);
    debug!("{} facet '{}': {} products", taxonomy, value, products.len());
    Ok(products)
}
