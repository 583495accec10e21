use std::fmt::Display;

/// Space separated rendering of `items`, e.g. `?from ?to` for a parameter list.
pub fn build_var_string<T: Display>(items: &[T]) -> String {
    let first = items.iter().take(1).fold(String::new(), |acc, item| acc + &item.to_string());
    items.iter().skip(1).fold(first, |acc, item| acc + " " + &item.to_string())
}
