//! HAL representations of items and item pages.

use std::collections::BTreeMap;

use primer_api_types::{EmbeddedItems, ItemCollection, ItemModel, Link, Links, PageMetadata};
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::domain::entities::ItemRecord;

pub const ITEMS_PATH: &str = "/api/items";

pub fn item_location(id: Uuid) -> String {
    format!("{ITEMS_PATH}/{id}")
}

pub fn item_model(item: &ItemRecord) -> ItemModel {
    let mut links = Links::new();
    links.insert("self".to_string(), Link::new(item_location(item.id)));
    links.insert("items".to_string(), Link::new(ITEMS_PATH));

    ItemModel {
        id: item.id,
        name: item.name.clone(),
        description: item.description.clone(),
        links,
    }
}

pub fn collection_model(page: &Page<ItemRecord>, request: &PageRequest) -> ItemCollection {
    let mut links: Links = BTreeMap::new();
    links.insert("self".to_string(), page_link(request, page.number));
    links.insert("first".to_string(), page_link(request, 0));
    if page.has_previous() {
        links.insert("prev".to_string(), page_link(request, page.number - 1));
    }
    if page.has_next() {
        links.insert("next".to_string(), page_link(request, page.number + 1));
    }
    links.insert("last".to_string(), page_link(request, page.last_page()));

    ItemCollection {
        embedded: EmbeddedItems {
            items: page.items.iter().map(item_model).collect(),
        },
        links,
        page: PageMetadata {
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            number: page.number,
        },
    }
}

fn page_link(request: &PageRequest, page: u32) -> Link {
    let target = request.with_page(page);
    let mut href = format!("{ITEMS_PATH}?page={}&size={}", target.page, target.size);
    if let Some(sort) = target.sort {
        href.push_str("&sort=");
        href.push_str(&sort.to_string());
    }
    Link::new(href)
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::application::pagination::{Sort, SortDirection, SortField};

    fn item(name: &str) -> ItemRecord {
        ItemRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} description"),
            version: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn item_links_point_at_itself() {
        let record = item("a");
        let model = item_model(&record);
        assert_eq!(model.links["self"].href, format!("/api/items/{}", record.id));
        assert_eq!(model.links["items"].href, "/api/items");
    }

    #[test]
    fn middle_page_links_both_ways() {
        let request = PageRequest::new(
            1,
            2,
            Some(Sort::new(SortField::Name, SortDirection::Desc)),
        );
        let page = Page::new(vec![item("c"), item("d")], &request, 5);

        let model = collection_model(&page, &request);
        assert_eq!(model.links["self"].href, "/api/items?page=1&size=2&sort=name,desc");
        assert_eq!(model.links["prev"].href, "/api/items?page=0&size=2&sort=name,desc");
        assert_eq!(model.links["next"].href, "/api/items?page=2&size=2&sort=name,desc");
        assert_eq!(model.links["last"].href, "/api/items?page=2&size=2&sort=name,desc");
        assert_eq!(model.page.total_pages, 3);
        assert_eq!(model.embedded.items.len(), 2);
    }

    #[test]
    fn empty_collection_has_no_neighbours() {
        let request = PageRequest::default();
        let page = Page::new(Vec::new(), &request, 0);

        let model = collection_model(&page, &request);
        assert!(!model.links.contains_key("prev"));
        assert!(!model.links.contains_key("next"));
        assert_eq!(model.links["last"].href, "/api/items?page=0&size=20");
    }
}
