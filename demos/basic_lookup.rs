//! Basic lookup example.
//!
//! Fetches a variable's attributes and runs a structured search.
//!
//! Run with: `cargo run --example basic_lookup`
//! Set `FFMETADATA_URL` to point at another deployment.

use ffmetadata::{ClientBuilder, Filter, FilterTree};

#[tokio::main]
async fn main() -> Result<(), ffmetadata::Error> {
    let client = ClientBuilder::from_env().build()?;

    // Every attribute of a variable
    let attrs = client.select_all("ce3datey").await?;
    for (name, value) in attrs.iter() {
        println!("{:>16}: {}", name, value);
    }

    // A couple of attributes only
    let subset = client
        .select_attributes("ce3datey", &["name", "data_source"])
        .await?;
    println!("Subset: {:?}", subset);

    // Constructed variables, or variables whose name starts with 'c'
    let names = client
        .search(FilterTree::or([
            Filter::eq("data_source", "constructed"),
            Filter::like("name", "c%"),
        ]))
        .await?;
    println!("{} matching variables", names.len());

    Ok(())
}
