use dbload::{common::Error, schema::TableSchema};

fn main() -> Result<(), Error> {
    let schema = TableSchema::users();
    println!("{}", serde_json::to_string_pretty(&schema)?);

    Ok(())
}
