//! Product catalog types and the pure query/filter layer.
//!
//! Filtering is side-effect free and order-preserving: with no sort key the
//! input order (catalog order) is kept, and every sort is stable so ties fall
//! back to catalog order.

use serde::{Deserialize, Serialize};

/// Sentinel accepted anywhere a category or subcategory filter is optional.
pub const ALL: &str = "All";

/// A catalog entry. The cart stores full copies of this struct, so later
/// catalog edits never reach into an existing cart or an archived purchase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub image: String,
    /// Unit price in minor currency units. Zero means "price on request";
    /// checkout substitutes the configured fallback unit price.
    pub price: i64,
    pub category: String,
    pub subcategory: String,
    pub highlights: Vec<String>,
    pub tags: Vec<String>,
    pub brand: String,
    pub condition: String,
    pub inventory: i32,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub product_count: i64,
}

/// Sort order for catalog listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Catalog order, untouched.
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Name,
}

/// Filter configuration for a catalog listing.
///
/// `None` (or the literal `"All"`) on category/subcategory means no filter.
/// The search term matches title, description, or any tag, case-insensitive.
#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub sort: SortKey,
}

impl CatalogFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some(ALL) => true,
            Some(category) => product.category == category,
        };
        let subcategory_ok = match self.subcategory.as_deref() {
            None | Some(ALL) => true,
            Some(subcategory) => product.subcategory == subcategory,
        };
        let search_ok = match self.search.as_deref() {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                product.title.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
                    || product.tags.iter().any(|t| t.to_lowercase().contains(&term))
            }
        };
        category_ok && subcategory_ok && search_ok
    }

    /// Applies the filter to a product slice, returning owned matches.
    ///
    /// Sorting uses `sort_by`, which is stable, so products comparing equal
    /// keep their relative catalog order.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut matched: Vec<Product> = products.iter().filter(|p| self.matches(p)).cloned().collect();
        match self.sort {
            SortKey::Featured => {}
            SortKey::PriceLow => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortKey::PriceHigh => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            SortKey::Name => matched.sort_by(|a, b| a.title.cmp(&b.title)),
        }
        matched
    }
}

/// Derives a URL-safe handle from a product title: lowercased, runs of
/// non-alphanumeric characters collapsed to `-`, no leading/trailing dash.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, title: &str, price: i64, category: &str, subcategory: &str, tags: &[&str]) -> Product {
        Product {
            id,
            handle: slugify(title),
            title: title.into(),
            description: format!("{title} description"),
            image: "/images/test.jpg".into(),
            price,
            category: category.into(),
            subcategory: subcategory.into(),
            highlights: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            brand: "Meraki".into(),
            condition: "New".into(),
            inventory: 5,
            seo_title: None,
            seo_description: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Leather Satchel", 4999, "Leather Goods", "Bags", &["leather", "handmade"]),
            product(2, "Oud Parfum", 2499, "Fragrances", "Unisex", &["oud", "woody"]),
            product(3, "Card Wallet", 1299, "Leather Goods", "Wallets", &["leather", "slim"]),
            product(4, "Amber Cologne", 2499, "Fragrances", "Men", &["amber"]),
        ]
    }

    #[test]
    fn no_filter_preserves_catalog_order() {
        let filter = CatalogFilter::default();
        let out = filter.apply(&catalog());
        assert_eq!(out.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn category_all_is_no_filter() {
        let filter = CatalogFilter { category: Some(ALL.into()), ..Default::default() };
        assert_eq!(filter.apply(&catalog()).len(), 4);
    }

    #[test]
    fn filters_by_category_and_subcategory() {
        let filter = CatalogFilter {
            category: Some("Leather Goods".into()),
            subcategory: Some("Wallets".into()),
            ..Default::default()
        };
        let out = filter.apply(&catalog());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 3);
    }

    #[test]
    fn search_matches_title_description_and_tags_case_insensitive() {
        let by_title = CatalogFilter { search: Some("SATCHEL".into()), ..Default::default() };
        assert_eq!(by_title.apply(&catalog())[0].id, 1);

        let by_tag = CatalogFilter { search: Some("woody".into()), ..Default::default() };
        assert_eq!(by_tag.apply(&catalog())[0].id, 2);

        let by_description = CatalogFilter { search: Some("wallet description".into()), ..Default::default() };
        assert_eq!(by_description.apply(&catalog())[0].id, 3);
    }

    #[test]
    fn unmatched_filter_yields_empty() {
        let filter = CatalogFilter { search: Some("yacht".into()), ..Default::default() };
        assert!(filter.apply(&catalog()).is_empty());
    }

    #[test]
    fn price_sort_is_stable_on_ties() {
        let filter = CatalogFilter { sort: SortKey::PriceLow, ..Default::default() };
        let out = filter.apply(&catalog());
        // Products 2 and 4 share a price; catalog order breaks the tie.
        assert_eq!(out.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2, 4, 1]);
    }

    #[test]
    fn name_sort_is_lexicographic() {
        let filter = CatalogFilter { sort: SortKey::Name, ..Default::default() };
        let titles: Vec<String> = filter.apply(&catalog()).into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Amber Cologne", "Card Wallet", "Leather Satchel", "Oud Parfum"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = CatalogFilter {
            category: Some("Fragrances".into()),
            sort: SortKey::PriceHigh,
            ..Default::default()
        };
        let once = filter.apply(&catalog());
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Leather Satchel"), "leather-satchel");
        assert_eq!(slugify("  Oud & Amber -- No. 5  "), "oud-amber-no-5");
        assert_eq!(slugify("Émigré"), "migr");
    }
}
