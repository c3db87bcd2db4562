//! Built-in product data
//!
//! `embedded_catalog` is the store's own clothing line, used when no remote
//! source is configured. `fallback_products` stands in for the upstream
//! product API when it cannot be reached.

use once_cell::sync::Lazy;

use crate::types::{Money, Product, Rating};

static EMBEDDED: Lazy<Vec<Product>> = Lazy::new(|| {
    vec![
        embedded("hoodie", 1200, "men", "t-shirt", "/images/Men/hoody/Black/main")
            .new_arrival(),
        embedded("HooDie", 1200, "men", "t-shirt", "/images/Men/hoody/Brown/mainb"),
        embedded("Hoodie", 1200, "men", "t-shirt", "/images/Men/hoody/white/mainw"),
        embedded("Shorts With Print", 1000, "men", "short", "/images/Men/Shorts_With_Print/Beige/short-main")
            .new_arrival(),
        embedded("Shorts With Print", 1000, "men", "short", "/images/Men/Shorts_With_Print/Black/short-main"),
        embedded("Shorts With Print", 1000, "men", "short", "/images/Men/Shorts_With_Print/navy Blue/short-mainb"),
        embedded("Straight Fit Shorts", 1000, "men", "short", "/images/Men/Straight_Fit Shorts/Beige/ss-main")
            .new_arrival(),
        embedded("Straight Fit Shorts", 1000, "men", "short", "/images/Men/Straight_Fit Shorts/Dark Green/Straight-Shorts-(main)"),
        embedded("T-Shirt", 1200, "men", "t-shirt", "/images/Men/T-Shirt/Black/T-Shirt (1main)"),
        embedded("T-Shirt", 1200, "men", "t-shirt", "/images/Men/T-Shirt/Dark_Gray/T-Shirt (main)"),
        embedded("T-Shirt", 1200, "men", "t-shirt", "/images/Men/T-Shirt/White/T-Shirtmain"),
        embedded("T-Shirt With Print", 1300, "men", "t-shirt", "/images/Men/T-Shirt_With_Print/light Green/T-Shirt (5) (main)"),
        embedded("T-Shirt With Print", 1300, "men", "t-shirt", "/images/Men/T-Shirt_With_Print/White/main"),
        embedded("Tank Top With Print", 900, "men", "t-shirt", "/images/Men/Tank_Top_With_ Print/Beige/tt-main"),
        embedded("Tank Top With Print", 900, "men", "t-shirt", "/images/Men/Tank_Top_With_ Print/Black/Tank-Topmain"),
        embedded("Tank Top With Print", 900, "men", "t-shirt", "/images/Men/Tank_Top_With_ Print/Navy Blue/Tank-Top main"),
        embedded("Cami Mini Dress", 2900, "lady", "dress", "/images/Lady/Cami Mini Dress/Light Blue/Mini-Dress (main)")
            .on_sale(),
        embedded("Cami Mini Dress", 2900, "lady", "dress", "/images/Lady/Cami Mini Dress/white/Mini-Dress (main)"),
        embedded("Crop Sweat Jacket", 1400, "lady", "sweatpant", "/images/Lady/Crop Sweat Jacket/Black/Jacket (main)")
            .new_arrival(),
        embedded("Crop Sweat Jacket", 1400, "lady", "sweatpant", "/images/Lady/Crop Sweat Jacket/White/Jacket (main)"),
        embedded("Cropped T-shirt With Print", 1600, "lady", "t-shirt", "/images/Lady/Cropped T-shirt With Print/Blue Wash/Cropped-T-Shirt-With-Print (main)"),
        embedded("Cropped T-shirt With Print", 1600, "lady", "t-shirt", "/images/Lady/Cropped T-shirt With Print/Olive Green/Cropped-T-Shirt-With-Print (main)"),
        embedded("Cropped T-shirt With Print", 1600, "lady", "t-shirt", "/images/Lady/Cropped T-Shirt With Print1/navy/T-Shirt (main)"),
        embedded("Cropped T-shirt With Print", 1600, "lady", "t-shirt", "/images/Lady/Cropped T-Shirt With Print1/Red/T-Shirt (main)"),
        embedded("Midi Dress", 2500, "lady", "dress", "/images/Lady/Midi Dress/Black/Mini-Dress (main)")
            .on_sale(),
        embedded("Midi Dress", 2500, "lady", "dress", "/images/Lady/Midi Dress/Pink/Mini-Dress (main)"),
        embedded("Off Shoulder T-Shirt", 1700, "lady", "t-shirt", "/images/Lady/Off Shoulder T-Shirt/Black/T-Shirt (main)"),
        embedded("Off Shoulder T-Shirt", 1700, "lady", "t-shirt", "/images/Lady/Off Shoulder T-Shirt/White/T-Shirt (main)"),
        embedded("T-Shirt With Print", 1000, "lady", "t-shirt", "/images/Lady/T-Shirt With Print/Light Pink/T-Shirt (main)-1"),
        embedded("T-Shirt With Print", 1000, "lady", "t-shirt", "/images/Lady/T-Shirt With Print/White/T-Shirt (main)"),
        embedded("Wide Leg Sweatpants", 1500, "lady", "sweatpant", "/images/Lady/Wide Leg Sweatpants/Black/Trouser (main)")
            .on_sale(),
        embedded("Wide Leg Sweatpants", 1500, "lady", "sweatpant", "/images/Lady/Wide Leg Sweatpants/White/Trouser (main)"),
    ]
});

fn embedded(title: &str, cents: u64, category: &str, subcategory: &str, image: &str) -> Product {
    Product::new(title, Money::from_cents(cents), category)
        .with_subcategory(subcategory)
        .with_image(image)
}

/// The embedded clothing catalog.
pub fn embedded_catalog() -> Vec<Product> {
    EMBEDDED.clone()
}

fn fallback(
    id: u64,
    title: &str,
    cents: u64,
    description: &str,
    category: &str,
    image: &str,
    rating: (f64, u32),
) -> Product {
    Product {
        id: Some(id),
        description: Some(description.to_string()),
        rating: Some(Rating {
            rate: rating.0,
            count: rating.1,
        }),
        ..Product::new(title, Money::from_cents(cents), category).with_image(image)
    }
}

/// Products served when the upstream API is unavailable.
pub fn fallback_products() -> Vec<Product> {
    const IMG: &str = "https://via.placeholder.com/300x400";
    vec![
        fallback(
            1,
            "Classic White T-Shirt",
            2999,
            "Premium quality cotton t-shirt with a comfortable fit",
            "men's clothing",
            &format!("{IMG}/FFFFFF/000000?text=White+T-Shirt"),
            (4.5, 120),
        ),
        fallback(
            2,
            "Slim Fit Jeans",
            4999,
            "Modern slim fit denim jeans with stretch comfort",
            "men's clothing",
            &format!("{IMG}/4169E1/FFFFFF?text=Jeans"),
            (4.2, 85),
        ),
        fallback(
            3,
            "Casual Sneakers",
            7999,
            "Comfortable everyday sneakers with cushioned sole",
            "men's clothing",
            &format!("{IMG}/000000/FFFFFF?text=Sneakers"),
            (4.7, 200),
        ),
        fallback(
            4,
            "Summer Dress",
            5999,
            "Light and breezy summer dress perfect for warm weather",
            "women's clothing",
            &format!("{IMG}/FFB6C1/000000?text=Summer+Dress"),
            (4.6, 150),
        ),
        fallback(
            5,
            "Leather Handbag",
            8999,
            "Elegant leather handbag with multiple compartments",
            "women's clothing",
            &format!("{IMG}/8B4513/FFFFFF?text=Handbag"),
            (4.4, 95),
        ),
        fallback(
            6,
            "Wireless Earbuds",
            9999,
            "High-quality wireless earbuds with noise cancellation",
            "electronics",
            &format!("{IMG}/000000/FFFFFF?text=Earbuds"),
            (4.8, 300),
        ),
        fallback(
            7,
            "Smart Watch",
            19999,
            "Feature-rich smartwatch with fitness tracking",
            "electronics",
            &format!("{IMG}/1E90FF/FFFFFF?text=Smart+Watch"),
            (4.5, 180),
        ),
        fallback(
            8,
            "Gold Necklace",
            14999,
            "Elegant gold-plated necklace with pendant",
            "jewelery",
            &format!("{IMG}/FFD700/000000?text=Necklace"),
            (4.3, 75),
        ),
    ]
}
