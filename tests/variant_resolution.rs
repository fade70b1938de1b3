//! End-to-end variant resolution against a scripted product page.
//!
//! These tests drive [`VariantResolver`] through a fake [`PageProbe`] whose
//! option availability, prices, and stock labels are scripted per
//! selection, the same way the live page reveals them one click at a time.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use toko_crawler::tokopedia::selectors::product;
use toko_crawler::tokopedia::{PageProbe, VariantAxis, VariantResolver};

/// What the scripted page shows once a given full selection is applied.
#[derive(Debug, Clone, Default)]
struct PageState {
    /// Text of the primary price label.
    final_price: Option<String>,
    /// Text of the fallback price label.
    fallback_price: Option<String>,
    /// Slash-price text, shown only for discounted selections.
    original_price: Option<String>,
    /// Stock label text.
    stock: Option<String>,
}

impl PageState {
    fn priced(price: &str, stock: &str) -> Self {
        Self {
            final_price: Some(price.to_string()),
            stock: Some(stock.to_string()),
            ..Default::default()
        }
    }

    fn discounted(price: &str, original: &str, stock: &str) -> Self {
        Self {
            final_price: Some(price.to_string()),
            original_price: Some(original.to_string()),
            stock: Some(stock.to_string()),
            ..Default::default()
        }
    }

    fn sold_out() -> Self {
        Self {
            final_price: Some("Rp100.000".to_string()),
            stock: Some("Stok habis".to_string()),
            ..Default::default()
        }
    }
}

/// A scripted product page.
///
/// `blocked` entries disable an option on one axis while another axis has a
/// given option selected, mimicking how picking a color greys out sizes.
struct FakeProbe {
    options: HashMap<String, Vec<String>>,
    blocked: Vec<Block>,
    states: HashMap<String, PageState>,
    selected: Mutex<HashMap<String, String>>,
    clicks: AtomicU32,
    price_reads: AtomicU32,
    interactions: AtomicU32,
}

struct Block {
    when_axis: String,
    when_option: String,
    axis: String,
    option: String,
}

impl FakeProbe {
    fn new(axes: &[VariantAxis]) -> Self {
        let options = axes
            .iter()
            .map(|axis| (axis.name.clone(), axis.options.clone()))
            .collect();
        Self {
            options,
            blocked: Vec::new(),
            states: HashMap::new(),
            selected: Mutex::new(HashMap::new()),
            clicks: AtomicU32::new(0),
            price_reads: AtomicU32::new(0),
            interactions: AtomicU32::new(0),
        }
    }

    /// Disables `axis=option` whenever `when_axis=when_option` is selected.
    fn block(mut self, when_axis: &str, when_option: &str, axis: &str, option: &str) -> Self {
        self.blocked.push(Block {
            when_axis: when_axis.to_string(),
            when_option: when_option.to_string(),
            axis: axis.to_string(),
            option: option.to_string(),
        });
        self
    }

    /// Scripts what the page shows once `selection` is fully applied.
    /// `selection` pairs may be given in any order.
    fn state(mut self, selection: &[(&str, &str)], state: PageState) -> Self {
        self.states.insert(Self::key_of(selection), state);
        self
    }

    fn key_of(selection: &[(&str, &str)]) -> String {
        let mut pairs: Vec<String> =
            selection.iter().map(|(a, o)| format!("{a}={o}")).collect();
        pairs.sort();
        pairs.join("|")
    }

    fn current_key(&self) -> String {
        let selected = self.selected.lock().unwrap();
        let mut pairs: Vec<String> =
            selected.iter().map(|(a, o)| format!("{a}={o}")).collect();
        pairs.sort();
        pairs.join("|")
    }

    fn current_state(&self) -> Option<PageState> {
        self.states.get(&self.current_key()).cloned()
    }

    fn clicks(&self) -> u32 {
        self.clicks.load(Ordering::SeqCst)
    }

    fn price_reads(&self) -> u32 {
        self.price_reads.load(Ordering::SeqCst)
    }

    fn interactions(&self) -> u32 {
        self.interactions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageProbe for FakeProbe {
    async fn text_of(&self, selector: &str) -> Option<String> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        let state = self.current_state()?;

        if selector == product::PRICE_FINAL[0] {
            self.price_reads.fetch_add(1, Ordering::SeqCst);
            return state.final_price;
        }
        if product::PRICE_FINAL.contains(&selector) {
            self.price_reads.fetch_add(1, Ordering::SeqCst);
            return state.fallback_price;
        }
        if selector == product::STOCK_LABEL {
            return state.stock;
        }
        if product::PRICE_ORIGINAL.contains(&selector) {
            return state.original_price;
        }
        None
    }

    async fn wait_for(&self, _selector: &str, _timeout: Duration) -> bool {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        self.current_state().is_some()
    }

    async fn enabled_options(&self, axis: &str) -> Vec<String> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        let Some(advertised) = self.options.get(axis) else {
            return Vec::new();
        };

        let selected = self.selected.lock().unwrap();
        advertised
            .iter()
            .filter(|option| {
                !self.blocked.iter().any(|block| {
                    block.axis == axis
                        && block.option == **option
                        && selected.get(&block.when_axis) == Some(&block.when_option)
                })
            })
            .cloned()
            .collect()
    }

    async fn select_option(&self, axis: &str, option: &str) -> bool {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        self.clicks.fetch_add(1, Ordering::SeqCst);

        match self.options.get(axis) {
            Some(advertised) if advertised.iter().any(|o| o == option) => {
                self.selected.lock().unwrap().insert(axis.to_string(), option.to_string());
                true
            }
            _ => false,
        }
    }

    async fn settle(&self) {}
}

fn axis(name: &str, options: &[&str]) -> VariantAxis {
    VariantAxis::new(name, options.iter().map(|s| s.to_string()).collect())
}

/// Single axis, every option purchasable at the same price.
#[tokio::test]
async fn single_axis_prices_every_option() {
    let axes = vec![axis("warna", &["Merah", "Biru", "Hijau"])];
    let probe = FakeProbe::new(&axes)
        .state(&[("warna", "Merah")], PageState::priced("Rp100.000", "Stok: 12"))
        .state(&[("warna", "Biru")], PageState::priced("Rp100.000", "Stok: 8"))
        .state(&[("warna", "Hijau")], PageState::priced("Rp100.000", "Stok: 3"));

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 3);
    for detail in &details {
        assert_eq!(detail.final_price, 100_000);
        assert_eq!(detail.original_price, Some(100_000));
        assert_eq!(detail.discount_percent, 0.0);
    }
    assert_eq!(details[0].variant_options.get("warna"), Some("Merah"));
    assert_eq!(details[0].stock, 12);
    assert_eq!(details[2].variant_options.get("warna"), Some("Hijau"));
    assert_eq!(details[2].stock, 3);
}

/// Selecting a base on the first axis narrows what the last axis offers;
/// combinations the page never offers are never attempted.
#[tokio::test]
async fn base_selection_narrows_last_axis() {
    let axes = vec![
        axis("warna", &["Merah", "Biru"]),
        axis("ukuran", &["Kecil", "Besar"]),
    ];
    let probe = FakeProbe::new(&axes)
        .block("warna", "Biru", "ukuran", "Besar")
        .state(
            &[("warna", "Merah"), ("ukuran", "Kecil")],
            PageState::priced("Rp95.000", "Stok: 5"),
        )
        .state(
            &[("warna", "Merah"), ("ukuran", "Besar")],
            PageState::priced("Rp105.000", "Stok: 2"),
        )
        .state(
            &[("warna", "Biru"), ("ukuran", "Kecil")],
            PageState::priced("Rp95.000", "Stok: 9"),
        );

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 3);
    let combos: Vec<String> =
        details.iter().map(|d| d.variant_options.to_string()).collect();
    assert_eq!(
        combos,
        vec![
            "warna=Merah, ukuran=Kecil",
            "warna=Merah, ukuran=Besar",
            "warna=Biru, ukuran=Kecil",
        ]
    );
    // The blocked combination never surfaced as a candidate
    assert!(!combos.iter().any(|c| c.contains("Biru") && c.contains("Besar")));
}

/// Discounted selection: discount computed from the two prices, one decimal.
#[tokio::test]
async fn discount_computed_from_slash_price() {
    let axes = vec![axis("warna", &["Merah"])];
    let probe = FakeProbe::new(&axes).state(
        &[("warna", "Merah")],
        PageState::discounted("Rp80.000", "Rp100.000", "Stok: 4"),
    );

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].final_price, 80_000);
    assert_eq!(details[0].original_price, Some(100_000));
    assert_eq!(details[0].discount_percent, 20.0);
}

/// Slash price with the "Harga sebelum diskon" label prefix still parses.
#[tokio::test]
async fn discount_with_label_prefix() {
    let axes = vec![axis("warna", &["Merah"])];
    let probe = FakeProbe::new(&axes).state(
        &[("warna", "Merah")],
        PageState::discounted("Rp90.000", "Harga sebelum diskon Rp120.000", "Stok: 1"),
    );

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].original_price, Some(120_000));
    assert_eq!(details[0].discount_percent, 25.0);
}

/// A sold-out selection is dropped before any price label is read.
#[tokio::test]
async fn sold_out_short_circuits_before_price_read() {
    let axes = vec![axis("warna", &["Merah", "Biru"])];
    let probe = FakeProbe::new(&axes)
        .state(&[("warna", "Merah")], PageState::sold_out())
        .state(&[("warna", "Biru")], PageState::priced("Rp100.000", "Stok: 7"));

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].variant_options.get("warna"), Some("Biru"));
    // Only the in-stock selection ever had its price label read
    assert_eq!(probe.price_reads(), 1);
}

/// A price range on the primary label drops the combination outright, even
/// when the fallback label holds a clean single price.
#[tokio::test]
async fn price_range_is_terminal_for_the_combination() {
    let axes = vec![axis("warna", &["Merah", "Biru"])];
    let probe = FakeProbe::new(&axes)
        .state(
            &[("warna", "Merah")],
            PageState {
                final_price: Some("Rp95.000 - Rp150.000".to_string()),
                fallback_price: Some("Rp95.000".to_string()),
                stock: Some("Stok: 10".to_string()),
                ..Default::default()
            },
        )
        .state(&[("warna", "Biru")], PageState::priced("Rp110.000", "Stok: 2"));

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    // The ranged selection must not fall through to the fallback label
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].variant_options.get("warna"), Some("Biru"));
    assert_eq!(details[0].final_price, 110_000);
}

/// Resolving the same axes twice yields identical results.
#[tokio::test]
async fn resolution_is_deterministic() {
    let axes = vec![
        axis("warna", &["Merah", "Biru"]),
        axis("ukuran", &["Kecil", "Besar"]),
    ];

    let build = || {
        FakeProbe::new(&axes)
            .block("warna", "Biru", "ukuran", "Kecil")
            .state(
                &[("warna", "Merah"), ("ukuran", "Kecil")],
                PageState::discounted("Rp85.000", "Rp100.000", "Stok: 6"),
            )
            .state(
                &[("warna", "Merah"), ("ukuran", "Besar")],
                PageState::priced("Rp100.000", "Stok: 4"),
            )
            .state(
                &[("warna", "Biru"), ("ukuran", "Besar")],
                PageState::priced("Rp100.000", "Stok: 1"),
            )
    };

    let probe_a = build();
    let first = VariantResolver::new(&probe_a).resolve(&axes).await;
    let probe_b = build();
    let second = VariantResolver::new(&probe_b).resolve(&axes).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

/// No variant axes means no page interaction at all.
#[tokio::test]
async fn no_axes_means_no_interaction() {
    let probe = FakeProbe::new(&[]);

    let details = VariantResolver::new(&probe).resolve(&[]).await;

    assert!(details.is_empty());
    assert_eq!(probe.interactions(), 0);
    assert_eq!(probe.clicks(), 0);
}

/// A selection whose price label never renders is dropped, not fatal.
#[tokio::test]
async fn missing_price_label_drops_the_combination() {
    let axes = vec![axis("warna", &["Merah", "Biru"])];
    // Only Biru is scripted; Merah's page state never materializes
    let probe = FakeProbe::new(&axes)
        .state(&[("warna", "Biru")], PageState::priced("Rp100.000", "Stok: 2"));

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].variant_options.get("warna"), Some("Biru"));
}

/// A missing stock label defaults to zero stock but keeps the combination.
#[tokio::test]
async fn missing_stock_label_defaults_to_zero() {
    let axes = vec![axis("warna", &["Merah"])];
    let probe = FakeProbe::new(&axes).state(
        &[("warna", "Merah")],
        PageState {
            final_price: Some("Rp100.000".to_string()),
            stock: None,
            ..Default::default()
        },
    );

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].stock, 0);
    assert_eq!(details[0].final_price, 100_000);
}

/// Three axes: bases span the first two, only the third is re-queried.
#[tokio::test]
async fn three_axes_traversal_order() {
    let axes = vec![
        axis("warna", &["Merah"]),
        axis("ukuran", &["Kecil", "Besar"]),
        axis("bahan", &["Katun"]),
    ];
    let probe = FakeProbe::new(&axes)
        .state(
            &[("warna", "Merah"), ("ukuran", "Kecil"), ("bahan", "Katun")],
            PageState::priced("Rp50.000", "Stok: 3"),
        )
        .state(
            &[("warna", "Merah"), ("ukuran", "Besar"), ("bahan", "Katun")],
            PageState::priced("Rp55.000", "Stok: 1"),
        );

    let details = VariantResolver::new(&probe).resolve(&axes).await;

    assert_eq!(details.len(), 2);
    assert_eq!(
        details[0].variant_options.to_string(),
        "warna=Merah, ukuran=Kecil, bahan=Katun"
    );
    assert_eq!(
        details[1].variant_options.to_string(),
        "warna=Merah, ukuran=Besar, bahan=Katun"
    );
}
