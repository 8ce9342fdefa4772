use curio_db::Database;
use curio_types::api::NewProduct;
use curio_types::models::{ProductId, UserId};

pub fn db() -> Database {
    Database::open_in_memory().unwrap()
}

pub fn user(db: &Database, name: &str) -> UserId {
    db.create_user(name, "hash", None).unwrap()
}

pub fn new_product(title: &str) -> NewProduct {
    NewProduct {
        title: title.into(),
        company_name: "Workshop".into(),
        link: "https://workshop.test/item".into(),
        image_url: "https://workshop.test/item.png".into(),
        description: None,
        country: "Norway".into(),
        materials: vec!["Oak".into()],
        collection: "Furniture".into(),
    }
}

pub fn product(db: &Database, owner: UserId) -> ProductId {
    crate::products::create_product(db, Some(owner), &new_product("Stool"))
        .unwrap()
        .id
}
