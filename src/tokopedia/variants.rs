//! Variant-space resolution: walking a product's variant chips to discover
//! which combinations are actually purchasable and what each one costs.
//!
//! The page only reveals real availability through interaction: picking an
//! option on an earlier axis filters which chips stay orderable on later
//! axes, so the advertised cross-product overstates what can be bought. The
//! resolver applies every partial assignment over all axes but the last
//! ("base"), re-reads the last axis's live chips under that base, and prices
//! each surviving combination by selecting it and reading the updated
//! price/stock labels.

use crate::tokopedia::models::{Combination, VariantAxis, VariantDetail};
use crate::tokopedia::page::PageProbe;
use crate::tokopedia::selectors::product;
use crate::text;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded wait for the price label to re-render after selection clicks.
const PRICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves the variant space of the product page behind `page`.
pub struct VariantResolver<'a, P: PageProbe> {
    page: &'a P,
}

impl<'a, P: PageProbe> VariantResolver<'a, P> {
    pub fn new(page: &'a P) -> Self {
        Self { page }
    }

    /// Prices every reachable combination of `axes`, in traversal order.
    ///
    /// Unpriceable candidates (sold out, no price label, ambiguous price)
    /// are dropped, not errors. With no axes there is nothing to do and the
    /// page is never touched.
    pub async fn resolve(&self, axes: &[VariantAxis]) -> Vec<VariantDetail> {
        if axes.is_empty() {
            return Vec::new();
        }

        let candidates = self.discover_candidates(axes).await;
        debug!(candidates = candidates.len(), "checking variant combinations");

        let mut details = Vec::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            debug!(
                candidate = %candidate,
                "pricing combination {}/{}",
                idx + 1,
                candidates.len()
            );
            match self.price(candidate).await {
                Some(detail) => details.push(detail),
                None => debug!(candidate = %candidate, "combination unavailable"),
            }
        }

        debug!(priced = details.len(), "variant resolution finished");
        details
    }

    /// Enumerates candidate combinations.
    ///
    /// A single axis is read live with no prior selection. With several
    /// axes, each base (cross-product of all axes but the last, first axis
    /// varying slowest) is applied on the page and only then is the last
    /// axis's real chip set read. Only the last axis gets this re-query;
    /// middle axes keep their advertised lists. Known limitation: an
    /// availability constraint between two non-final axes goes unnoticed.
    async fn discover_candidates(&self, axes: &[VariantAxis]) -> Vec<Combination> {
        if let [axis] = axes {
            return self
                .page
                .enabled_options(&axis.name)
                .await
                .into_iter()
                .map(|option| {
                    let mut combination = Combination::new();
                    combination.set(axis.name.clone(), option);
                    combination
                })
                .collect();
        }

        let Some((last, leading)) = axes.split_last() else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for base in cross_product(leading) {
            for (axis, option) in base.iter() {
                if !self.page.select_option(axis, option).await {
                    warn!(axis, option, "click failed while applying base");
                }
                self.page.settle().await;
            }

            for option in self.page.enabled_options(&last.name).await {
                let mut combination = base.clone();
                combination.set(last.name.clone(), option);
                candidates.push(combination);
            }
        }

        candidates
    }

    /// Selects one combination on the page and reads back price and stock.
    ///
    /// Returns `None` when the combination cannot be priced. Selection
    /// clicks are best-effort: a failed click is logged and pricing
    /// proceeds with whatever state resulted.
    async fn price(&self, combination: &Combination) -> Option<VariantDetail> {
        for (axis, option) in combination.iter() {
            if !self.page.select_option(axis, option).await {
                warn!(axis, option, "click failed, pricing best-effort");
            }
            self.page.settle().await;
        }

        if !self.page.wait_for(product::PRICE_FINAL[0], PRICE_TIMEOUT).await {
            debug!("price label never appeared");
            return None;
        }

        // Stock first: a sold-out label short-circuits before any price read
        let mut stock = 0;
        if let Some(stock_text) = self.page.text_of(product::STOCK_LABEL).await {
            if stock_text.to_lowercase().contains(product::OUT_OF_STOCK_MARKER) {
                debug!(stock = %stock_text, "selection is sold out");
                return None;
            }
            stock = text::first_integer(&stock_text).unwrap_or(0);
        }

        let final_price = self.read_final_price().await?;
        let original_price = self.read_original_price().await;

        Some(VariantDetail::new(combination.clone(), final_price, original_price, stock))
    }

    /// First well-formed single price across the final-price strategies.
    ///
    /// A range indicator in a matched label is terminal for the whole
    /// combination: the page is still showing the un-narrowed price, so any
    /// fallback selector would read a different selection state.
    async fn read_final_price(&self) -> Option<u64> {
        for selector in product::PRICE_FINAL {
            let Some(price_text) = self.page.text_of(selector).await else {
                continue;
            };
            if text::is_price_range(&price_text) {
                debug!(price = %price_text, "price range shown, dropping combination");
                return None;
            }
            if let Some(value) = text::clean_price(&price_text) {
                return Some(value);
            }
        }
        None
    }

    /// Slash price across its strategies; `None` means no discount shown.
    async fn read_original_price(&self) -> Option<u64> {
        for selector in product::PRICE_ORIGINAL {
            let Some(raw) = self.page.text_of(selector).await else {
                continue;
            };
            let stripped = strip_prefix_ci(&raw, product::SLASH_PRICE_PREFIX);
            if let Some(value) = text::clean_price(stripped.trim()) {
                return Some(value);
            }
        }
        None
    }
}

/// Cross-product of the given axes' advertised options, first axis varying
/// slowest. One empty combination when `axes` is empty.
fn cross_product(axes: &[VariantAxis]) -> Vec<Combination> {
    let mut combos = vec![Combination::new()];
    for axis in axes {
        let mut extended = Vec::with_capacity(combos.len() * axis.options.len());
        for combo in &combos {
            for option in &axis.options {
                let mut next = combo.clone();
                next.set(axis.name.clone(), option.clone());
                extended.push(next);
            }
        }
        combos = extended;
    }
    combos
}

/// Strips an ASCII prefix regardless of case, e.g. the "Harga sebelum
/// diskon" noise in front of some slash-price labels.
fn strip_prefix_ci<'t>(text: &'t str, prefix: &str) -> &'t str {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &text[prefix.len()..],
        _ => text,
    }
}
