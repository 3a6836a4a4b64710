//! List strip background colours.

use snapstrip_strip_model::{PaletteColor, StripBackground};

pub fn run() -> anyhow::Result<()> {
    println!("{:<14} Hex", "Colour");
    println!("{}", "=".repeat(24));
    for color in PaletteColor::ALL {
        println!("{:<14} {}", color.label(), StripBackground::from(color).hex());
    }
    println!();
    println!("Any #rrggbb value is also accepted.");
    Ok(())
}
