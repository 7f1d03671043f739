use ledgerline_core::{AccountingError, ChartLookup, Context, Result, TaxKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template::Template;

/// Product variant of a template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub template: Uuid,
    pub code: String,
}

impl Product {
    pub fn new(template: &Template, code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            template: template.id,
            code: code.to_string(),
        }
    }

    /// The template's own taxes of `kind` in the context's company. This is
    /// the stored assignment, not the category-aware resolution.
    pub fn taxes<C>(
        &self,
        template: &Template,
        chart: &C,
        kind: TaxKind,
        ctx: &Context,
    ) -> Result<Vec<Uuid>>
    where
        C: ChartLookup + ?Sized,
    {
        if template.id != self.template {
            return Err(AccountingError::UnknownTemplate(template.id));
        }
        Ok(chart.company_taxes(template.taxes(kind), ctx))
    }
}

#[cfg(test)]
mod tests {
    use ledgerline_core::{Chart, Tax, TaxGroupKind};

    use super::*;
    use crate::config::AccountingDefaults;

    #[test]
    fn variant_taxes_ignore_category_deferral() {
        let company = Uuid::new_v4();
        let ctx = Context::for_company(company);
        let mut chart = Chart::new();
        let vat = Tax::new(company, "VAT", Some(TaxGroupKind::Purchase));
        let foreign = Tax::new(Uuid::new_v4(), "Foreign", Some(TaxGroupKind::Purchase));
        chart.insert_tax(vat.clone());
        chart.insert_tax(foreign.clone());

        let mut template = Template::new("Bolt", &AccountingDefaults::default(), &ctx);
        template.taxes_category = true;
        template.supplier_taxes = vec![foreign.id, vat.id];
        let product = Product::new(&template, "BOLT-M4");

        assert_eq!(
            product.taxes(&template, &chart, TaxKind::Supplier, &ctx),
            Ok(vec![vat.id])
        );
    }

    #[test]
    fn variant_rejects_a_foreign_template() {
        let ctx = Context::default();
        let template = Template::new("Bolt", &AccountingDefaults::default(), &ctx);
        let other = Template::new("Nut", &AccountingDefaults::default(), &ctx);
        let product = Product::new(&template, "BOLT-M4");

        assert_eq!(
            product.taxes(&other, &Chart::new(), TaxKind::Customer, &ctx),
            Err(AccountingError::UnknownTemplate(other.id))
        );
    }
}
