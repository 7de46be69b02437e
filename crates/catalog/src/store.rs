use crate::error::Result;
use crate::types::{CatalogQuery, Product};
use async_trait::async_trait;

/// Read-only access to the verified product catalog.
///
/// The analysis pipeline never writes to the catalog; implementations are
/// free to back this with a remote document store or a static data set.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// List products matching the query, sorted ascending by carbon
    /// factor.
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Product>>;

    /// Products in `category` with a carbon factor strictly below
    /// `max_factor`, ascending, at most `limit` entries.
    async fn lower_carbon_alternatives(
        &self,
        category: &str,
        max_factor: f64,
        limit: usize,
    ) -> Result<Vec<Product>>;
}

/// In-memory catalog over a fixed product list.
///
/// Backs the demo mode and the test suites; the filtering semantics match
/// the production store (case-insensitive containment, factor-ascending
/// order).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn matches(product: &Product, query: &CatalogQuery) -> bool {
        if let Some(category) = &query.category {
            if !product
                .category
                .to_lowercase()
                .contains(&category.to_lowercase())
            {
                return false;
            }
        }

        if let Some(ceiling) = query.max_carbon_factor {
            if product.carbon_factor > ceiling {
                return false;
            }
        }

        if let Some(term) = &query.term {
            let term = term.to_lowercase();
            let hit = product.name.to_lowercase().contains(&term)
                || product.category.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Product>> {
        let mut hits: Vec<Product> = self
            .products
            .iter()
            .filter(|p| Self::matches(p, query))
            .cloned()
            .collect();

        hits.sort_by(|a, b| {
            a.carbon_factor
                .partial_cmp(&b.carbon_factor)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }

        log::debug!("Catalog search returned {} products", hits.len());
        Ok(hits)
    }

    async fn lower_carbon_alternatives(
        &self,
        category: &str,
        max_factor: f64,
        limit: usize,
    ) -> Result<Vec<Product>> {
        let mut hits: Vec<Product> = self
            .products
            .iter()
            .filter(|p| {
                p.category.eq_ignore_ascii_case(category) && p.carbon_factor < max_factor
            })
            .cloned()
            .collect();

        hits.sort_by(|a, b| {
            a.carbon_factor
                .partial_cmp(&b.carbon_factor)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, category: &str, factor: f64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: String::new(),
            carbon_factor: factor,
            declared_unit: "m³".to_string(),
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            product("p1", "Portland Cement Concrete", "Structural", 0.13),
            product("p2", "Low-Carbon Concrete Mix", "Structural", 0.08),
            product("p3", "Steel Beam", "Structural", 1.85),
            product("p4", "Mineral Wool Insulation", "Insulation", 1.2),
        ])
    }

    #[tokio::test]
    async fn search_sorts_by_factor_ascending() {
        let hits = catalog()
            .search(&CatalogQuery::all().with_category("Structural"))
            .await
            .unwrap();

        let factors: Vec<f64> = hits.iter().map(|p| p.carbon_factor).collect();
        assert_eq!(factors, vec![0.08, 0.13, 1.85]);
    }

    #[tokio::test]
    async fn search_term_is_case_insensitive() {
        let hits = catalog()
            .search(&CatalogQuery::all().with_term("CONCRETE"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn search_honors_ceiling_and_limit() {
        let hits = catalog()
            .search(
                &CatalogQuery::all()
                    .with_max_carbon_factor(1.5)
                    .with_limit(2),
            )
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|p| p.carbon_factor <= 1.5));
    }

    #[tokio::test]
    async fn alternatives_are_strictly_below_ceiling() {
        let hits = catalog()
            .lower_carbon_alternatives("Structural", 0.13, 3)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p2");
    }

    #[tokio::test]
    async fn alternatives_respect_limit() {
        let hits = catalog()
            .lower_carbon_alternatives("Structural", 10.0, 2)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert!(hits[0].carbon_factor <= hits[1].carbon_factor);
    }
}
