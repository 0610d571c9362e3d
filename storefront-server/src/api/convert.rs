//! Type conversion
//!
//! Turns repository rows into client-facing models. Media paths become
//! absolute URLs here.

use shared::models::{
    Category, CategoryListItem, CategoryWithCount, CompanyListItem, ProductImage,
    ProductImageView, ProductListItem,
};

use crate::db::repository::company::CompanyWithCounts;
use crate::db::repository::product::ProductRow;
use crate::utils::MediaUrls;

// ============ Category ============

pub fn category_list_item(category: &Category, product_count: i64, media: &MediaUrls) -> CategoryListItem {
    CategoryListItem {
        id: category.id,
        name: category.name.clone(),
        image_url: media.url_opt(category.image.as_deref()),
        product_count,
        parent: category.parent_id,
    }
}

pub fn category_list_items(rows: &[CategoryWithCount], media: &MediaUrls) -> Vec<CategoryListItem> {
    rows.iter()
        .map(|row| category_list_item(&row.category, row.product_count, media))
        .collect()
}

// ============ Company ============

pub fn company_list_item(row: CompanyWithCounts, media: &MediaUrls) -> CompanyListItem {
    let logo_url = media.url_opt(row.company.logo.as_deref());
    CompanyListItem {
        id: row.company.id,
        name: row.company.name,
        logo: row.company.logo,
        logo_url,
        slug: row.company.slug,
        categories_count: row.categories_count,
        products_count: row.products_count,
    }
}

// ============ Product ============

pub fn product_list_item(row: &ProductRow, media: &MediaUrls) -> ProductListItem {
    ProductListItem {
        id: row.id,
        title: row.title.clone(),
        seller_code: row.seller_code.clone(),
        price: row.price(),
        primary_image: media.url_opt(row.primary_image.as_deref()),
        category_name: row.category_name.clone(),
        seller_name: row.seller_name(),
        in_stock: row.in_stock,
        is_featured: row.is_featured,
        brand: row.brand.clone(),
        created_at: row.created_at,
    }
}

pub fn product_list_items(rows: &[ProductRow], media: &MediaUrls) -> Vec<ProductListItem> {
    rows.iter().map(|row| product_list_item(row, media)).collect()
}

/// The product's category as a list item
pub fn product_category(row: &ProductRow, media: &MediaUrls) -> CategoryListItem {
    CategoryListItem {
        id: row.category_id,
        name: row.category_name.clone(),
        image_url: media.url_opt(row.category_image.as_deref()),
        product_count: row.category_product_count,
        parent: row.category_parent_id,
    }
}

pub fn product_image_view(image: ProductImage, media: &MediaUrls) -> ProductImageView {
    ProductImageView {
        id: image.id,
        image_url: media.url(&image.image),
        alt_text: image.alt_text,
        is_primary: image.is_primary,
        order: image.sort_order,
    }
}
