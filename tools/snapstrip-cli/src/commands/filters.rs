//! List capture filters.

use snapstrip_strip_model::FilterDescriptor;

pub fn run() -> anyhow::Result<()> {
    println!("{:<12} CSS equivalent", "Filter");
    println!("{}", "=".repeat(60));
    for filter in FilterDescriptor::ALL {
        println!("{:<12} {}", filter.tag(), filter.css());
    }
    Ok(())
}
