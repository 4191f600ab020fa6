//! IEEE conference (IEEEtran) document rendering.

use crate::paper::model::{Author, Paper};
use std::fmt::Write;

const DEFAULT_TITLE: &str = "Conference Paper Title";
const DEFAULT_ABSTRACT: &str = "This document presents research findings. \
Please replace this abstract with your actual research abstract.";
const DEFAULT_KEYWORDS: &str = "keyword1, keyword2, keyword3";
const DEFAULT_REFERENCE: &str = "\\bibitem{b1} Author Name, ``Paper Title,'' Journal Name, \
vol. X, no. Y, pp. Z-ZZ, Month Year.";
const DEFAULT_AUTHOR_BLOCK: &str = "\\IEEEauthorblockN{Author Name}
\\IEEEauthorblockA{\\textit{Department} \\\\
\\textit{Organization}\\\\
City, Country \\\\
email@example.com}";

const PREAMBLE: &str = "\\documentclass[conference]{IEEEtran}
\\IEEEoverridecommandlockouts

\\usepackage{cite}
\\usepackage{amsmath,amssymb,amsfonts}
\\usepackage{algorithmic}
\\usepackage{graphicx}
\\usepackage{textcomp}
\\usepackage{xcolor}
\\def\\BibTeX{{\\rm B\\kern-.05em{\\sc i\\kern-.025em b}\\kern-.08em
    T\\kern-.1667em\\lower.7ex\\hbox{E}\\kern-.125emX}}
";

/// Escape LaTeX special characters in one pass, so replacement text is
/// never itself re-escaped.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '<' => out.push_str("\\textless{}"),
            '>' => out.push_str("\\textgreater{}"),
            _ => out.push(c),
        }
    }
    out
}

fn escaped_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => escape_latex(v),
        None => escape_latex(fallback),
    }
}

fn author_block(index: usize, author: &Author) -> String {
    let fallback_name = format!("Author {}", index + 1);
    let name = escaped_or(Some(&author.name), &fallback_name);
    let affiliation = escaped_or(author.affiliation.as_deref(), "Organization");
    let city = escaped_or(author.city.as_deref(), "City");
    let country = escaped_or(author.country.as_deref(), "Country");
    let email = escaped_or(author.email.as_deref(), "email@example.com");

    let mut block = format!("\\IEEEauthorblockN{{ {name}}}\n\\IEEEauthorblockA{{");
    if let Some(department) = author.department.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(block, "\\textit{{{}}} \\\\", escape_latex(department.trim()));
    }
    let _ = writeln!(block, "\\textit{{{affiliation}}} \\\\");
    let _ = writeln!(block, "{city}, {country} \\\\");
    let _ = write!(block, "{email}}}");
    block
}

fn authors(authors: &[Author]) -> String {
    if authors.is_empty() {
        return DEFAULT_AUTHOR_BLOCK.to_string();
    }
    authors
        .iter()
        .enumerate()
        .map(|(i, a)| author_block(i, a))
        .collect::<Vec<_>>()
        .join("\n\\and\n")
}

fn keywords(keywords: &[String]) -> String {
    if keywords.is_empty() {
        return DEFAULT_KEYWORDS.to_string();
    }
    keywords
        .iter()
        .map(|k| escape_latex(k))
        .collect::<Vec<_>>()
        .join(", ")
}

fn references(references: &[String]) -> String {
    if references.is_empty() {
        return DEFAULT_REFERENCE.to_string();
    }
    references
        .iter()
        .enumerate()
        .map(|(i, r)| format!("\\bibitem{{b{}}} {}", i + 1, escape_latex(r)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn section(doc: &mut String, heading: &str, body: Option<&str>, placeholder: &str) {
    let _ = writeln!(doc, "\\section{{{heading}}}");
    let _ = writeln!(doc, "{}", escaped_or(body, placeholder));
    doc.push('\n');
}

/// Render `paper` as a complete IEEEtran conference document. Missing
/// fields get placeholder text, so the output always compiles.
pub fn generate_ieee_latex(paper: &Paper) -> String {
    let mut doc = String::from(PREAMBLE);
    doc.push_str("\n\\begin{document}\n\n");

    let _ = writeln!(doc, "\\title{{{}}}\n", escaped_or(Some(&paper.title), DEFAULT_TITLE));
    let _ = writeln!(doc, "\\author{{\n{}\n}}\n", authors(&paper.authors));
    doc.push_str("\\maketitle\n\n");

    let _ = writeln!(
        doc,
        "\\begin{{abstract}}\n{}\n\\end{{abstract}}\n",
        escaped_or(Some(&paper.abstract_text), DEFAULT_ABSTRACT)
    );
    let _ = writeln!(
        doc,
        "\\begin{{IEEEkeywords}}\n{}\n\\end{{IEEEkeywords}}\n",
        keywords(&paper.keywords)
    );

    section(
        &mut doc,
        "Introduction",
        paper.introduction.as_deref(),
        "This section should contain the introduction to your research.",
    );
    section(
        &mut doc,
        "Literature Review",
        paper.literature_review.as_deref(),
        "This section should contain a review of related literature.",
    );
    section(
        &mut doc,
        "Methodology",
        paper.methodology.as_deref(),
        "This section should describe your research methodology.",
    );
    section(
        &mut doc,
        "Conclusion",
        paper.conclusion.as_deref(),
        "This section should present your conclusions and future work.",
    );

    let _ = writeln!(
        doc,
        "\\begin{{thebibliography}}{{00}}\n{}\n\\end{{thebibliography}}\n",
        references(&paper.references)
    );
    doc.push_str("\\end{document}\n");
    doc
}

/// Download name for the `.tex` export.
pub fn tex_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_ieee.tex", stem.to_lowercase())
}
