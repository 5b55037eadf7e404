use std::cmp::Ordering;

use crate::types::{Category, Restaurant, ViewMode};

pub const TOP_N: usize = 10;

pub fn filter_by_category(restaurants: &[Restaurant], category: Category) -> Vec<Restaurant> {
    restaurants
        .iter()
        .filter(|r| category == Category::All || r.category == category)
        .cloned()
        .collect()
}

/// Highest rating first; ties keep their original order.
pub fn sort_by_rating(mut restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
    restaurants.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
    restaurants
}

pub fn apply_view(mut restaurants: Vec<Restaurant>, view: ViewMode) -> Vec<Restaurant> {
    if view == ViewMode::Top10 {
        restaurants.truncate(TOP_N);
    }
    restaurants
}

/// Filtered and sorted list plus the page to display.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub total: usize,
    pub restaurants: Vec<Restaurant>,
}

pub fn select(restaurants: &[Restaurant], category: Category, view: ViewMode) -> Selection {
    let sorted = sort_by_rating(filter_by_category(restaurants, category));
    Selection {
        total: sorted.len(),
        restaurants: apply_view(sorted, view),
    }
}
