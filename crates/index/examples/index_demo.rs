use index::{IndexConfig, IndexError, SetIndex, SizePolicy};

fn main() -> Result<(), IndexError> {
    let cfg = IndexConfig::new()
        .with_size_policy(SizePolicy::Distinct)
        .with_capacity(4);
    let mut index: SetIndex<String, &str> = SetIndex::with_config(cfg);

    index.add("guide".into(), ["rust", "memory", "safety", "borrow"])?;
    index.add("notes".into(), ["rust", "borrow", "checker", "borrow"])?;
    index.add("recipe".into(), ["flour", "water", "salt"])?;

    if let Err(err) = index.add("guide".into(), ["duplicate"]) {
        println!("rejected: {err}");
    }

    println!(
        "{} items, {} distinct elements",
        index.len(),
        index.element_count()
    );

    let query = ["rust", "borrow", "lifetime"];
    let candidates = index.matches(query);
    for (slot, shared) in candidates.iter() {
        if let Some(item) = index.item(slot) {
            println!(
                "{:>8}: shares {shared} of {} query elements (item size {})",
                item.id(),
                candidates.query_size(index.config().size_policy),
                index.size_of(slot)
            );
        }
    }

    let summary = serde_json::json!({
        "postings.rust": index.postings("rust").len(),
        "postings.borrow": index.postings("borrow").len(),
    });
    println!("{summary}");
    Ok(())
}
