//! CSS/XPath selectors for Tokopedia pages.
//!
//! All selectors used to locate elements live here, including the ordered
//! fallback lists for fields Tokopedia renders under rotating hashed class
//! names. Update this file when the site changes its markup.
//!
//! **Update process**: when extraction starts coming back empty, capture the
//! page HTML, fix the selector (or prepend a new candidate to its fallback
//! list), and adjust the affected tests.

/// Selectors for search results pages.
pub mod search {
    /// Anchor that signals the results grid has rendered.
    pub const RESULTS_READY: &str = "[data-testid='dSRPSearchInfo']";

    /// "You searched for ..." strong element holding the query text.
    pub const SEARCH_INFO_QUERY: &str = "[data-testid='dSRPSearchInfo'] strong";

    /// Active filter chips above the grid.
    pub const FILTER_CHIP: &str = "button[data-unify='Chip']";

    /// Product card containers, most specific first.
    pub const PRODUCT_CARD: &[&str] = &[
        "[data-testid='spnSRP - Product Card']",
        ".css-bk6tzz",
        "[data-testid='divSRPContentProducts'] > div > div",
        ".css-1sn1xa2",
        ".pcv3_product_content",
        ".css-5wh65g",
    ];

    /// Product title inside a card.
    pub const TITLE: &[&str] = &[
        "span[class*='_0T8-iGxMpV6NEsYEhwkqEg']",
        "[data-testid='spnSRPProdName']",
        ".css-3um8ox",
    ];

    /// Displayed (final) price inside a card.
    pub const PRICE_FINAL: &[&str] = &[
        "div[class*='_67d6E1xDKIzw']",
        "[data-testid='spnSRPProdPrice']",
        ".css-h66vau",
    ];

    /// Struck-through original price inside a card.
    pub const PRICE_ORIGINAL: &[&str] = &[
        "span[class*='q6wH9+Ht7LxnxrEgD22BCQ']",
        "div[class*='strike']",
    ];

    /// Discount badge inside a card.
    pub const DISCOUNT: &[&str] = &[
        "span[class*='vRrrC5GSv6FRRkbCqM7QcQ']",
        "span[style*='background: rgb(249, 77, 99)']",
    ];

    /// Card image, most specific first.
    pub const IMAGE: &[&str] = &[
        "img[alt='product-image']",
        "img[src*='tokopedia.net']",
        "img",
    ];

    /// Container whose text lines are seller name then location.
    pub const SELLER_BLOCK: &str = "div[class*='Jh7geoVa-F3B5Hk8ORh2qw']";

    /// Card star rating text.
    pub const RATING: &[&str] = &[
        "span[class*='_9jWGz3C-GX7Myq']",
        "[data-testid='icnSRPRating'] + span",
    ];

    /// Sold-count label ("100+ terjual").
    pub const SOLD_COUNT: &[&str] = &["span[class*='se8WAnkjbVXZNA8mT']"];
}

/// Selectors for product detail pages.
pub mod product {
    /// Description block; also used as the page-loaded signal.
    pub const DESCRIPTION: &str = "div[data-testid='lblPDPDescriptionProduk']";

    /// "See more" button expanding the truncated description.
    pub const DESCRIPTION_EXPAND: &str = "//button[contains(text(),'Lihat Selengkapnya') \
         or contains(text(),'Lihat lebih') or contains(text(),'Lihat Semua')]";

    /// Variant axis headers ("Pilih warna: ...").
    pub const VARIANT_HEADERS: &str = "//p[starts-with(@data-testid,'pdpVariantTitle#')]";

    /// Chip group that follows an axis header.
    pub const VARIANT_GROUP: &str = "following-sibling::div[@class='css-hayuji']";

    /// Chips still orderable under the current selection, including the one
    /// already selected. Disabled/out-of-stock chips use other testids.
    pub const VARIANT_ACTIVE_CHIPS: &str =
        "div[data-testid='btnVariantChipActive'] button, \
         div[data-testid='btnVariantChipActiveSelected'] button";

    /// Displayed price; waited on after every variant selection.
    pub const PRICE_FINAL: &[&str] =
        &["p[data-testid='pdpProductPrice']", ".css-brw1im-unf-heading"];

    /// Slash price shown when the selection is discounted.
    pub const PRICE_ORIGINAL: &[&str] = &[
        "p[data-testid='pdpSlashPrice'] del",
        "del[data-testid='pdpSlashPrice']",
        "p[color='var(--NN400, #98A3B4)'] del",
        ".css-14nwhqu-unf-heading del",
    ];

    /// Stock label for the current selection.
    pub const STOCK_LABEL: &str = "p[data-testid='stock-label']";

    /// Marker text meaning the selection is sold out.
    pub const OUT_OF_STOCK_MARKER: &str = "habis";

    /// Prefix noise on some slash-price labels.
    pub const SLASH_PRICE_PREFIX: &str = "harga sebelum diskon";

    /// Seller rating heading in the shop credibility block.
    pub const SELLER_RATING: &str =
        "//div[contains(@class,'css-b6ktge')]//p[contains(@class,'css-1gvq2cb-unf-heading')]";

    /// Gallery thumbnails.
    pub const IMAGE_THUMBNAILS: &str = "button[data-testid='PDPImageThumbnail'] img";

    /// "Dikirim dari <b>city</b>" heading.
    pub const DELIVERY_ORIGIN: &str = "//h2[contains(text(),'Dikirim dari')]";

    /// Condition / min-order / etalase info list.
    pub const INFO_LIST: &str = "ul[data-testid='lblPDPInfoProduk']";
}

/// Selectors for the review section.
pub mod reviews {
    /// One review article.
    pub const ARTICLE: &str = "//article[contains(@class,'css-15m2bcr')]";

    /// Reviewer display name.
    pub const USER_NAME: &str = ".//span[@class='name']";

    /// "Varian: ..." label.
    pub const VARIANT: &str = ".//p[@data-testid='lblVarian']";

    /// Relative timestamp.
    pub const TIME_AGO: &str = ".//p[contains(@class,'css-vqrjg4')]";

    /// Star rating element; the count is in its aria-label ("bintang 5").
    pub const STAR_RATING: &str = ".//div[@data-testid='icnStarRating']";

    /// "Read more" button on truncated review text.
    pub const EXPAND: &str =
        ".//button[contains(text(),'Selengkapnya') or contains(text(),'Lihat Ulasan')]";

    /// Review body span.
    pub const BODY: &str = ".//span[@data-testid='lblItemUlasan']";

    /// Attached review photo.
    pub const PHOTO: &str = ".//img[@data-testid='imgItemPhotoulasan']";

    /// Pagination nav for the review list.
    pub const PAGINATION: &str = "nav[aria-label='Navigasi laman'][data-unify='Pagination']";

    /// Next-page button inside the pagination nav.
    pub const NEXT_PAGE: &str = "button[aria-label='Laman berikutnya']";
}
