//! In-memory PDF rendering for tickets and invoices.
//!
//! Layouts use the builtin Helvetica faces, so amounts are printed as
//! `Rs.` rather than the rupee sign.

use eventz_common::{AppError, AppResult};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};

use super::qr::QrMatrix;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const QR_SIZE: f32 = 55.0;

// Points to millimetres.
const PT: f32 = 0.3528;

/// Fields printed on a ticket.
#[derive(Debug, Clone)]
pub struct TicketDocument {
    pub user_name: String,
    pub event_title: String,
    pub ticket_type: String,
    pub quantity: i32,
    pub event_date: String,
    pub venue: String,
    pub registration_number: String,
    /// `None` for free tickets.
    pub amount_paid: Option<i64>,
}

/// Fields printed on an invoice.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub issued_on: String,
    pub user_name: String,
    pub user_email: String,
    pub event_title: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_amount: i64,
}

enum Align {
    Left,
    Center,
    Right,
}

struct Page {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("PDF rendering failed: {e}"))
}

impl Page {
    /// Rough Helvetica width, good enough for centring a line.
    #[allow(clippy::cast_precision_loss)]
    fn text_width(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5 * PT
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&self, text: &str, size: f32, y: f32, x: f32, align: &Align, bold: bool, color: Color) {
        let x = match align {
            Align::Left => x,
            Align::Center => (PAGE_WIDTH - Self::text_width(text, size)) / 2.0,
            Align::Right => PAGE_WIDTH - MARGIN - Self::text_width(text, size),
        };
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(color);
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn label_value(&self, label: &str, value: &str, x: f32, y: f32) {
        self.text(label, 10.0, y, x, &Align::Left, false, rgb(107, 114, 128));
        self.text(value, 12.0, y - 6.0, x, &Align::Left, true, rgb(17, 24, 39));
    }

    fn rule(&self, y: f32) {
        self.layer.set_outline_color(rgb(229, 231, 235));
        self.layer.set_outline_thickness(0.8);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    fn qr(&self, matrix: &QrMatrix, top: f32) {
        let width = matrix.width() as f32;
        let module = QR_SIZE / width;
        let left = (PAGE_WIDTH - QR_SIZE) / 2.0;

        self.layer.set_fill_color(rgb(0, 0, 0));
        for (x, y) in matrix.dark_modules() {
            let llx = left + x as f32 * module;
            let ury = top - y as f32 * module;
            self.layer.add_rect(Rect::new(
                Mm(llx),
                Mm(ury - module),
                Mm(llx + module),
                Mm(ury),
            ));
        }
    }
}

fn new_page(title: &str) -> AppResult<(printpdf::PdfDocumentReference, Page)> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let layer = doc.get_page(page).get_layer(layer);
    Ok((doc, Page {
        layer,
        regular,
        bold,
    }))
}

/// Render a ticket with its QR code.
pub fn render_ticket(ticket: &TicketDocument, qr: &QrMatrix) -> AppResult<Vec<u8>> {
    let (doc, page) = new_page(&format!("Ticket {}", ticket.registration_number))?;
    let dark = || rgb(17, 24, 39);

    let mut y = PAGE_HEIGHT - 30.0;
    page.text("EVENT TICKET", 24.0, y, 0.0, &Align::Center, true, dark());
    y -= 10.0;
    page.text(&ticket.event_title, 14.0, y, 0.0, &Align::Center, false, rgb(107, 114, 128));
    y -= 8.0;
    page.rule(y);

    let left = MARGIN + 4.0;
    let right = PAGE_WIDTH / 2.0 + 4.0;

    y -= 14.0;
    page.label_value("Name", &ticket.user_name, left, y);
    page.label_value(
        "Ticket Type",
        &format!("{} x {}", ticket.ticket_type, ticket.quantity),
        right,
        y,
    );
    y -= 18.0;
    page.label_value("Date", &ticket.event_date, left, y);
    page.label_value("Venue", &ticket.venue, right, y);
    y -= 18.0;
    page.label_value("Registration Number", &ticket.registration_number, left, y);
    if let Some(amount) = ticket.amount_paid {
        page.label_value("Amount Paid", &format!("Rs. {amount}"), right, y);
    }

    y -= 16.0;
    page.rule(y);
    y -= 10.0;
    page.text(
        "Scan this QR code at the event entry",
        12.0,
        y,
        0.0,
        &Align::Center,
        false,
        rgb(55, 65, 81),
    );
    y -= 6.0;
    page.qr(qr, y);
    y -= QR_SIZE + 14.0;

    page.text(
        "This ticket is auto-generated. Please carry a valid ID for verification.",
        10.0,
        y,
        0.0,
        &Align::Center,
        false,
        rgb(156, 163, 175),
    );

    doc.save_to_bytes().map_err(pdf_error)
}

/// Render an invoice.
pub fn render_invoice(invoice: &InvoiceDocument) -> AppResult<Vec<u8>> {
    let (doc, page) = new_page(&format!("Invoice {}", invoice.invoice_number))?;
    let dark = || rgb(17, 24, 39);
    let muted = || rgb(107, 114, 128);

    let mut y = PAGE_HEIGHT - 28.0;
    page.text("INVOICE", 22.0, y, 0.0, &Align::Right, true, dark());
    y -= 8.0;
    page.text(
        &format!("Invoice Number: {}", invoice.invoice_number),
        10.0,
        y,
        0.0,
        &Align::Right,
        false,
        muted(),
    );
    y -= 5.0;
    page.text(&format!("Date: {}", invoice.issued_on), 10.0, y, 0.0, &Align::Right, false, muted());

    y -= 16.0;
    page.text(
        "Thank you for registering for the event. This document serves as confirmation",
        11.0,
        y,
        MARGIN,
        &Align::Left,
        false,
        dark(),
    );
    y -= 5.5;
    page.text(
        "of your successful payment and event registration.",
        11.0,
        y,
        MARGIN,
        &Align::Left,
        false,
        dark(),
    );

    y -= 14.0;
    page.text("Billed To", 12.0, y, MARGIN, &Align::Left, true, dark());
    y -= 6.0;
    page.text(&invoice.user_name, 11.0, y, MARGIN, &Align::Left, false, dark());
    y -= 5.5;
    page.text(&invoice.user_email, 11.0, y, MARGIN, &Align::Left, false, dark());

    y -= 12.0;
    page.text(
        &format!("Event Name: {}", invoice.event_title),
        12.0,
        y,
        MARGIN,
        &Align::Left,
        false,
        dark(),
    );

    let columns = [MARGIN, 123.0, 145.0, 170.0];
    y -= 14.0;
    for (header, x) in ["Description", "Qty", "Unit Price", "Amount"].iter().zip(columns) {
        page.text(header, 11.0, y, x, &Align::Left, true, dark());
    }
    y -= 3.0;
    page.rule(y);
    y -= 7.0;
    let row = [
        "Event Registration Ticket".to_string(),
        invoice.quantity.to_string(),
        format!("Rs. {}", invoice.unit_price),
        format!("Rs. {}", invoice.total_amount),
    ];
    for (cell, x) in row.iter().zip(columns) {
        page.text(cell, 11.0, y, x, &Align::Left, false, dark());
    }

    y -= 18.0;
    page.text(
        &format!("Total Amount Paid: Rs. {}", invoice.total_amount),
        14.0,
        y,
        0.0,
        &Align::Right,
        true,
        dark(),
    );

    y -= 16.0;
    page.text(
        "Payment has been received successfully. Please retain this invoice for your records.",
        11.0,
        y,
        MARGIN,
        &Align::Left,
        false,
        rgb(55, 65, 81),
    );

    y -= 16.0;
    page.text(
        "This is a system-generated invoice and does not require a physical signature.",
        10.0,
        y,
        0.0,
        &Align::Center,
        false,
        rgb(156, 163, 175),
    );
    y -= 5.0;
    page.text(
        "For any queries, please contact the event organizer.",
        10.0,
        y,
        0.0,
        &Align::Center,
        false,
        rgb(156, 163, 175),
    );

    doc.save_to_bytes().map_err(pdf_error)
}
