// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_notes_html(sections: usize) -> String {
    let mut html = String::from("<h1>Notes</h1>");
    for section in 0..sections {
        html.push_str(&format!("<h2>Section {section}</h2><p>Intro with <strong>key terms</strong> &amp; detail.</p>"));
        html.push_str(&format!("<h3>Sub {section}</h3><ul><li>first</li><li>second</li></ul>"));
        html.push_str("<table><thead><tr><th>Year</th><th>Event</th></tr></thead><tbody><tr><td>1947</td><td>a</td></tr><tr><td>1950</td><td>b</td></tr></tbody></table>");
    }
    html
}
