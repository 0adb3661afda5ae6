//! Built-in menu catalog for the sales / service / rental console.
//!
//! Bump [`BUILTIN_TAXONOMY_VERSION`] whenever a key is added, removed or its
//! allowed actions change.

use std::sync::OnceLock;

use crate::{Action, MenuNode, MenuTaxonomy};

pub const BUILTIN_TAXONOMY_VERSION: u32 = 3;

const ROOT_KEY: &str = "root";

pub fn builtin_root() -> MenuNode {
    use crate::Action::{Add, Delete, Edit, View};

    let crud = [View, Add, Edit, Delete];
    let no_delete = [View, Add, Edit];

    MenuNode::new(ROOT_KEY, "Menu", []).with_children(vec![
        MenuNode::new("dashboard", "Dashboard", [View]),
        MenuNode::new("sales", "Sales", [View]).with_children(vec![
            MenuNode::new("salesAllCategory", "All Category", crud),
            MenuNode::new("salesProducts", "Products", crud),
            MenuNode::new("salesOrders", "Orders", no_delete),
            MenuNode::new("salesEnquiries", "Enquiries", [View, Edit, Delete]),
        ]),
        MenuNode::new("service", "Service", [View]).with_children(vec![
            MenuNode::new("serviceAllCategory", "All Category", crud),
            MenuNode::new("serviceProducts", "Products", crud),
            MenuNode::new("serviceRequests", "Requests", no_delete),
        ]),
        MenuNode::new("rental", "Rental", [View]).with_children(vec![
            MenuNode::new("rentalAllCategory", "All Category", crud),
            MenuNode::new("rentalProducts", "Products", crud),
            MenuNode::new("rentalOrders", "Orders", no_delete),
        ]),
        MenuNode::new("companies", "Companies", [View]).with_children(vec![
            MenuNode::new("companyList", "Company List", crud),
            MenuNode::new("companyContacts", "Contacts", crud),
        ]),
        MenuNode::new("invoices", "Invoices", [View]).with_children(vec![
            MenuNode::new("invoiceList", "Invoice List", no_delete),
            MenuNode::new("invoicePayments", "Payments", no_delete),
        ]),
        MenuNode::new("employees", "Employees", [View]).with_children(vec![
            MenuNode::new("employeeList", "Employee List", crud),
            MenuNode::new("employeePermissions", "Permissions", [View, Edit]),
        ]),
        MenuNode::new("gst", "GST", [View]).with_children(vec![
            MenuNode::new("gstRates", "GST Rates", crud),
            MenuNode::new("gstReturns", "GST Returns", [View]),
        ]),
        MenuNode::new("reports", "Reports", [View]).with_children(vec![
            MenuNode::new("salesReport", "Sales Report", [View]),
            MenuNode::new("serviceReport", "Service Report", [View]),
            MenuNode::new("rentalReport", "Rental Report", [View]),
        ]),
        MenuNode::new("settings", "Settings", [View]).with_children(vec![
            MenuNode::new("companyProfile", "Company Profile", [View, Edit]),
            MenuNode::new("menuSettings", "Menu Settings", [View, Edit]),
        ]),
    ])
}

impl MenuTaxonomy {
    /// The compiled-in taxonomy, indexed on first use.
    pub fn builtin() -> &'static MenuTaxonomy {
        static BUILTIN: OnceLock<MenuTaxonomy> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            MenuTaxonomy::new(BUILTIN_TAXONOMY_VERSION, builtin_root())
                .expect("built-in menu catalog has unique, non-empty keys")
        })
    }
}
