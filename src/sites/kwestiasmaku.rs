//! kwestiasmaku.com recipe pages
//!
//! A page is a recipe when it carries the ingredients group, the preparation
//! group and the photo view. Everything else is harvested for links.

use crate::crawler::{fetch_page, FetchResult};
use crate::model::{IngredientsGroup, Recipe};
use crate::sites::{Classification, Site};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

const DOMAIN: &str = "kwestiasmaku.com";

/// Site collaborator for kwestiasmaku.com
#[derive(Debug, Clone, Copy, Default)]
pub struct KwestiaSmaku;

#[async_trait]
impl Site for KwestiaSmaku {
    fn name(&self) -> &str {
        DOMAIN
    }

    fn domain(&self) -> &str {
        DOMAIN
    }

    async fn classify(&self, client: &Client, url: &str) -> Classification {
        tracing::debug!("Scraping {}", url);

        let body = match fetch_page(client, url).await {
            FetchResult::Success { body, .. } => body,
            FetchResult::HttpError { status_code, body } => {
                return Classification::not_document(
                    body,
                    format!("HTTP {} for {}", status_code, url),
                );
            }
            FetchResult::NetworkError { error } => {
                return Classification::not_document(
                    String::new(),
                    format!("failed to fetch {}: {}", url, error),
                );
            }
        };

        match parse_recipe(url, &body) {
            Ok(document) => Classification::Document { document, body },
            Err(reason) => Classification::not_document(body, reason),
        }
    }
}

/// Extracts a recipe from a kwestiasmaku.com page
///
/// # Returns
///
/// * `Ok(Recipe)` - The page is a recipe
/// * `Err(String)` - Which required section was missing
pub fn parse_recipe(url: &str, html: &str) -> Result<Recipe, String> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let ingredients = find(root, "div.group-skladniki")
        .ok_or_else(|| format!("group-skladniki not found; not a recipe: {}", url))?;
    let preparation = find(root, "div.group-przepis")
        .ok_or_else(|| format!("group-przepis not found; not a recipe: {}", url))?;
    let view = find(root, "div.view-content")
        .ok_or_else(|| format!("view-content not found; not a recipe: {}", url))?;

    Ok(Recipe {
        url: url.to_string(),
        name: find(root, "h1.page-header")
            .map(text_of)
            .unwrap_or_default(),
        portions: find_portions(ingredients),
        ingredients: find_ingredients(ingredients),
        steps: find_steps(preparation),
        imgs: find_images(view),
    })
}

fn find<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn find_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn find_portions(ingredients: ElementRef<'_>) -> i32 {
    find(ingredients, "div.field-name-field-ilosc-porcji")
        .and_then(|div| {
            let text = text_of(div);
            text.split_whitespace().next()?.parse::<i32>().ok()
        })
        .unwrap_or(-1)
}

/// Each child holding `li` items is a group, named after the last highlighted
/// (`wyroznione`) child seen before it.
fn find_ingredients(ingredients: ElementRef<'_>) -> Vec<IngredientsGroup> {
    let Some(list) = find(ingredients, "div.field-name-field-skladniki") else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let mut group_name = String::new();

    for child in list.children().filter_map(ElementRef::wrap) {
        let items = find_all(child, "li");
        if !items.is_empty() {
            groups.push(IngredientsGroup {
                name: group_name.clone(),
                ingredients: items.into_iter().map(text_of).collect(),
            });
        } else if child
            .value()
            .attr("class")
            .is_some_and(|class| class.contains("wyroznione"))
        {
            group_name = text_of(child);
        }
    }

    groups
}

fn find_steps(preparation: ElementRef<'_>) -> Vec<String> {
    match find(preparation, "div.field-name-field-przygotowanie") {
        Some(div) => find_all(div, "li").into_iter().map(text_of).collect(),
        None => Vec::new(),
    }
}

fn find_images(view: ElementRef<'_>) -> Vec<String> {
    find_all(view, "img")
        .into_iter()
        .filter_map(|img| img.value().attr("src").map(str::to_string))
        .collect()
}
