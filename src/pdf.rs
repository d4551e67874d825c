use std::io::BufWriter;

use chrono::Local;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use regex::Regex;

use crate::error::{Result, RolodexError};
use crate::fmt::money;
use crate::models::Customer;
use crate::report::ProcessedTransaction;
use crate::settings::Settings;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_LEFT: f32 = 14.0;
const PAGE_RIGHT: f32 = 196.0;
const TABLE_W: f32 = PAGE_RIGHT - MARGIN_LEFT;
const ROW_H: f32 = 5.0;
const DETAIL_FONT_SIZE: f32 = 9.0;

/// Near-bottom threshold for detail sections, checked before drawing each
/// section so a header band and its table always start on the same page.
const DETAIL_BREAK_Y: f32 = 250.0;
/// Continuation-page cursor reset, just below the branding band.
const PAGE_TOP_RESET: f32 = 26.0;
/// Physical bottom of the body area; rows wrap here as a safety net so a
/// single oversized table cannot run into the footer zone.
const BODY_MAX_Y: f32 = 272.0;
const FOOTER_RULE_Y: f32 = 280.0;
const FOOTER_TEXT_Y: f32 = 285.0;

/// Volume guard: at most this many transactions get full detail tables per
/// report; the rest stay in the summary and a trailing note reports the
/// truncation. Overridable per call (`export sales --limit`).
pub const DEFAULT_DETAIL_CAP: usize = 25;

const PRIMARY: (u8, u8, u8) = (155, 135, 245);
const SECONDARY: (u8, u8, u8) = (126, 105, 171);
const LIGHT: (u8, u8, u8) = (214, 188, 250);
const DARK: (u8, u8, u8) = (26, 31, 44);
const GRAY: (u8, u8, u8) = (142, 145, 150);
const WHITE: (u8, u8, u8) = (255, 255, 255);
const ROW_ALT: (u8, u8, u8) = (248, 250, 252);

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn pdf_y(y: f32) -> f32 {
    PAGE_H - y
}

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

fn needs_page_break(y: f32) -> bool {
    y > DETAIL_BREAK_Y
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

const SUMMARY_COLS: &[Col] = &[
    Col { width: 45.0, align: Align::Left },
    Col { width: 40.0, align: Align::Left },
    Col { width: 55.0, align: Align::Left },
    Col { width: 42.0, align: Align::Right },
];

const DETAIL_COLS: &[Col] = &[
    Col { width: 30.0, align: Align::Left },
    Col { width: 70.0, align: Align::Left },
    Col { width: 25.0, align: Align::Right },
    Col { width: 28.0, align: Align::Right },
    Col { width: 29.0, align: Align::Right },
];

/// Owns the document, fonts and page list. The vertical cursor is *not*
/// held here: section builders take the current offset and return the next
/// one, so layout state is explicit at every call site.
struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    brand_tag: String,
}

impl PdfWriter {
    fn new(title: &str, brand_tag: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        // Font registration is the layout primitive everything else needs;
        // if it fails the whole build aborts rather than emitting a
        // document with missing tables.
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RolodexError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RolodexError::Pdf(format!("{e:?}")))?;
        let writer = Self {
            doc,
            font,
            font_bold,
            pages: vec![(page, layer)],
            brand_tag: brand_tag.to_string(),
        };
        writer.branding();
        Ok(writer)
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.pages.len() - 1];
        self.doc.get_page(page).get_layer(layer)
    }

    /// Start a new page, stamp the branding band, return the reset cursor.
    fn new_page(&mut self) -> f32 {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.pages.push((page, layer));
        self.branding();
        PAGE_TOP_RESET
    }

    /// Logo block and company tag, fixed offset at the top of every page.
    fn branding(&self) {
        self.fill_rect(MARGIN_LEFT, 10.0, 30.0, 10.0, PRIMARY);
        self.text_colored(&self.brand_tag, MARGIN_LEFT + 3.0, 16.5, 12.0, true, WHITE);
    }

    fn text(&self, s: &str, x: f32, y: f32, size: f32, bold: bool) {
        self.text_colored(s, x, y, size, bold, DARK);
    }

    fn text_colored(&self, s: &str, x: f32, y: f32, size: f32, bold: bool, color: (u8, u8, u8)) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self.layer();
        layer.set_fill_color(rgb(color));
        layer.use_text(s, size, Mm(x), Mm(pdf_y(y)), &font);
    }

    fn hline(&self, x1: f32, x2: f32, y: f32, thickness: f32, color: (u8, u8, u8)) {
        let layer = self.layer();
        layer.set_outline_color(rgb(color));
        layer.set_outline_thickness(thickness);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(pdf_y(y))), false),
                (Point::new(Mm(x2), Mm(pdf_y(y))), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    /// Filled rectangle; `top` is the top edge in top-down page coordinates.
    fn fill_rect(&self, x: f32, top: f32, w: f32, h: f32, color: (u8, u8, u8)) {
        let layer = self.layer();
        layer.set_fill_color(rgb(color));
        let ring = vec![
            (Point::new(Mm(x), Mm(pdf_y(top))), false),
            (Point::new(Mm(x + w), Mm(pdf_y(top))), false),
            (Point::new(Mm(x + w), Mm(pdf_y(top + h))), false),
            (Point::new(Mm(x), Mm(pdf_y(top + h))), false),
        ];
        layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn table_header(
        &self,
        y: f32,
        cols: &[Col],
        headers: &[&str],
        fill: (u8, u8, u8),
    ) -> f32 {
        self.fill_rect(MARGIN_LEFT, y - 4.5, TABLE_W, 6.5, fill);
        let mut x = MARGIN_LEFT + 1.0;
        for (i, col) in cols.iter().enumerate() {
            if i < headers.len() {
                match col.align {
                    Align::Left => {
                        self.text_colored(headers[i], x, y, DETAIL_FONT_SIZE, true, WHITE)
                    }
                    Align::Right => {
                        let tw = approx_text_width(headers[i], DETAIL_FONT_SIZE);
                        self.text_colored(
                            headers[i],
                            x + col.width - tw - 2.0,
                            y,
                            DETAIL_FONT_SIZE,
                            true,
                            WHITE,
                        );
                    }
                }
            }
            x += col.width;
        }
        y + ROW_H + 1.5
    }

    fn table_row(
        &mut self,
        y: f32,
        cols: &[Col],
        values: &[&str],
        alt_fill: bool,
        emphasize_last: bool,
    ) -> f32 {
        let mut y = y;
        if y + ROW_H > BODY_MAX_Y {
            y = self.new_page();
        }
        if alt_fill {
            self.fill_rect(MARGIN_LEFT, y - 3.8, TABLE_W, ROW_H, ROW_ALT);
        }
        let mut x = MARGIN_LEFT + 1.0;
        for (i, col) in cols.iter().enumerate() {
            if i < values.len() {
                let bold = emphasize_last && i == cols.len() - 1;
                match col.align {
                    Align::Left => self.text(values[i], x, y, DETAIL_FONT_SIZE, bold),
                    Align::Right => {
                        let tw = approx_text_width(values[i], DETAIL_FONT_SIZE);
                        self.text(values[i], x + col.width - tw - 2.0, y, DETAIL_FONT_SIZE, bold);
                    }
                }
            }
            x += col.width;
        }
        y + ROW_H
    }

    /// Second pass once the page count is final: page numbers, footer rule
    /// and the company contact line on every page.
    fn footer_pass(&self, contact: &str) {
        let count = self.pages.len();
        for (i, (page, layer_idx)) in self.pages.iter().enumerate() {
            let layer = self.doc.get_page(*page).get_layer(*layer_idx);
            layer.set_outline_color(rgb(PRIMARY));
            layer.set_outline_thickness(0.1);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(MARGIN_LEFT), Mm(pdf_y(FOOTER_RULE_Y))), false),
                    (Point::new(Mm(PAGE_RIGHT), Mm(pdf_y(FOOTER_RULE_Y))), false),
                ],
                is_closed: false,
            });
            layer.set_fill_color(rgb(GRAY));
            let label = format!("Page {} of {}", i + 1, count);
            let x = PAGE_RIGHT - approx_text_width(&label, 8.0);
            layer.use_text(label, 8.0, Mm(x), Mm(pdf_y(FOOTER_TEXT_Y)), &self.font);
            if !contact.is_empty() {
                layer.use_text(contact, 8.0, Mm(MARGIN_LEFT), Mm(pdf_y(FOOTER_TEXT_Y)), &self.font);
            }
        }
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| RolodexError::Pdf(format!("{e:?}")))?;
        Ok(buf.into_inner().map_err(|e| RolodexError::Pdf(e.to_string()))?)
    }
}

// ---------------------------------------------------------------------------
// Section builders
// ---------------------------------------------------------------------------

fn title_section(w: &PdfWriter) {
    w.text("Customer Sales Report", 50.0, 20.0, 24.0, true);
    w.hline(MARGIN_LEFT, PAGE_RIGHT, 24.0, 0.5, PRIMARY);
}

/// Two fixed-offset blocks: customer master data on the left, report
/// metadata on the right. Constant height, so no cursor is involved.
fn customer_panel(
    w: &PdfWriter,
    customer: &Customer,
    transactions: &[ProcessedTransaction],
    total_amount: f64,
) {
    w.text("Customer Details", MARGIN_LEFT, 34.0, 12.0, true);
    w.text(
        &format!("Name: {} ({})", customer.custname, customer.custno),
        MARGIN_LEFT,
        42.0,
        12.0,
        false,
    );
    w.text(
        &format!("Address: {}", customer.address.as_deref().unwrap_or("N/A")),
        MARGIN_LEFT,
        50.0,
        12.0,
        false,
    );
    w.text(
        &format!("Payment Terms: {}", customer.payterm.as_deref().unwrap_or("N/A")),
        MARGIN_LEFT,
        58.0,
        12.0,
        false,
    );

    w.text("Report Information", 120.0, 34.0, 12.0, true);
    w.text(
        &format!("Generated: {}", Local::now().format("%m/%d/%Y")),
        120.0,
        42.0,
        12.0,
        false,
    );
    w.text(
        &format!("Total Transactions: {}", transactions.len()),
        120.0,
        50.0,
        12.0,
        false,
    );
    w.text(
        &format!("Total Amount: {}", money(total_amount)),
        120.0,
        58.0,
        12.0,
        false,
    );

    w.hline(MARGIN_LEFT, PAGE_RIGHT, 65.0, 0.2, GRAY);
}

/// One row per transaction; returns the cursor just below the table.
fn summary_table(w: &mut PdfWriter, transactions: &[ProcessedTransaction]) -> f32 {
    w.text("Sales Transactions", MARGIN_LEFT, 75.0, 14.0, true);
    let mut y = w.table_header(
        80.0,
        SUMMARY_COLS,
        &["Transaction #", "Date", "Employee", "Total Amount"],
        PRIMARY,
    );
    for (i, t) in transactions.iter().enumerate() {
        let total = money(t.total);
        y = w.table_row(
            y,
            SUMMARY_COLS,
            &[&t.transno, &t.date, &t.employee, &total],
            i % 2 == 1,
            false,
        );
    }
    y
}

fn truncation_note(total: usize, cap: usize) -> Option<String> {
    if total > cap {
        Some(format!(
            "Detailed the first {cap} of {total} transactions; {} older transactions appear in the summary only.",
            total - cap
        ))
    } else {
        None
    }
}

/// One header band + detail table per transaction, in the already-sorted
/// order, capped by the volume guard. The page-break check runs before each
/// section is drawn, never after, so a section is never split mid-table.
fn detail_sections(
    w: &mut PdfWriter,
    start_y: f32,
    transactions: &[ProcessedTransaction],
    cap: usize,
) {
    let mut y = start_y;
    if needs_page_break(y) {
        y = w.new_page();
    }
    w.text("Transaction Details", MARGIN_LEFT, y, 14.0, true);
    y += 10.0;

    let shown = transactions.len().min(cap);
    for (i, sale) in transactions.iter().take(shown).enumerate() {
        if needs_page_break(y) {
            y = w.new_page();
        }

        w.fill_rect(MARGIN_LEFT, y - 5.0, TABLE_W, 8.0, LIGHT);
        w.text(
            &format!("Transaction #{} - {}", sale.transno, sale.date),
            MARGIN_LEFT + 2.0,
            y,
            12.0,
            true,
        );
        y += 8.0;

        if sale.details.is_empty() {
            w.text(
                "No line items recorded for this transaction.",
                MARGIN_LEFT + 2.0,
                y,
                DETAIL_FONT_SIZE,
                false,
            );
            y += ROW_H;
        } else {
            y = w.table_header(
                y,
                DETAIL_COLS,
                &["Product", "Description", "Quantity", "Unit Price", "Subtotal"],
                SECONDARY,
            );
            for d in &sale.details {
                let desc = d.description.as_deref().unwrap_or("N/A");
                let qty = d.quantity.to_string();
                let price = money(d.unit_price);
                let subtotal = money(d.subtotal);
                y = w.table_row(
                    y,
                    DETAIL_COLS,
                    &[&d.prodcode, desc, &qty, &price, &subtotal],
                    false,
                    true,
                );
            }
        }

        y += if i + 1 < shown { 20.0 } else { 5.0 };
    }

    if let Some(note) = truncation_note(transactions.len(), cap) {
        if needs_page_break(y) {
            y = w.new_page();
        }
        w.text_colored(&note, MARGIN_LEFT, y, 9.0, false, GRAY);
    }
}

fn brand_tag(settings: &Settings) -> String {
    if settings.company_name.is_empty() {
        "COMPANY".to_string()
    } else {
        settings.company_name.to_uppercase()
    }
}

fn contact_line(settings: &Settings) -> String {
    [
        settings.company_name.as_str(),
        settings.company_address.as_str(),
        settings.company_phone.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .cloned()
    .collect::<Vec<_>>()
    .join(" | ")
}

// ---------------------------------------------------------------------------
// Rendering and artifact naming
// ---------------------------------------------------------------------------

/// Build the full report document and serialize it. Both the download and
/// preview verbs call this; they differ only in what happens to the bytes.
pub fn render_sales_report(
    customer: &Customer,
    transactions: &[ProcessedTransaction],
    settings: &Settings,
    detail_cap: usize,
) -> Result<Vec<u8>> {
    let mut w = PdfWriter::new("Customer Sales Report", &brand_tag(settings))?;
    title_section(&w);
    let total_amount: f64 = transactions.iter().map(|t| t.total).sum();
    customer_panel(&w, customer, transactions, total_amount);
    let y = summary_table(&mut w, transactions);
    detail_sections(&mut w, y + 15.0, transactions, detail_cap);
    w.footer_pass(&contact_line(settings));
    w.to_bytes()
}

/// Strip everything outside [A-Za-z0-9] from a customer id before it goes
/// into a filename.
pub fn sanitize_custno(custno: &str) -> String {
    Regex::new(r"[^A-Za-z0-9]")
        .map(|re| re.replace_all(custno, "_").into_owned())
        .unwrap_or_else(|_| {
            custno
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect()
        })
}

pub fn report_filename(custno: &str) -> String {
    let date = Local::now().format("%Y-%m-%d");
    format!("{}_Sales_Report_{}.pdf", sanitize_custno(custno), date)
}
