//! Text rendering for report payloads.
//!
//! Core reports carry message keys and parameters only. [`TemplateCatalog`]
//! owns one tera template per key and locale and turns them into sentences.

use std::collections::BTreeMap;

use dealscope_core::domain::stage::Locale;
use dealscope_core::narrative::Translate;
use tera::{Context, Tera};

const EN_TEMPLATES: &[(&str, &str)] = &[
    ("narrative.status.high", "Deal volume is high with {{ deal_count }} deals tracked."),
    ("narrative.status.stable", "Deal volume is stable at {{ deal_count }} deals."),
    ("narrative.trend.increasing", "Conversion is rising at {{ conversion_rate }}%."),
    ("narrative.trend.stable", "Conversion is steady at {{ conversion_rate }}%."),
    ("narrative.trend.decreasing", "Conversion is falling at {{ conversion_rate }}%."),
    ("narrative.loss.needs_attention", "{{ lost_count }} lost deals need attention."),
    ("narrative.loss.under_control", "Losses are under control ({{ lost_count }} lost)."),
    ("narrative.pipeline.strong", "The open pipeline is strong at {{ open_value }}."),
    ("narrative.pipeline.stable", "The open pipeline is stable at {{ open_value }}."),
    ("narrative.pipeline.weak", "The open pipeline is weak at {{ open_value }}."),
    ("narrative.top_product", "{{ product }} leads with {{ count }} deals."),
    ("narrative.top_product.none", "No product stands out yet."),
    ("recommendation.cross_sell.summary", "Offer {{ product }} alongside {{ source_product }}."),
    (
        "recommendation.cross_sell.detail",
        "{{ customer }} is buying {{ source_product }}; customers like them usually add {{ product }}.",
    ),
    ("recommendation.benchmark.summary", "Benchmark against {{ product }}."),
    (
        "recommendation.benchmark.detail",
        "At {{ value }} this deal is large enough to position {{ product }} for {{ customer }}.",
    ),
    ("recommendation.upsell.summary", "Add {{ product }} to the offer."),
    (
        "recommendation.upsell.detail",
        "{{ customer }} can run {{ source_product }} on managed {{ product }}.",
    ),
    ("recommendation.reactivation.summary", "Re-engage with {{ product }}."),
    (
        "recommendation.reactivation.detail",
        "The deal has been in its stage for {{ aging_days }} days; a {{ product }} session can restart it.",
    ),
    ("recommendation.none", "No recommendations for this deal."),
    ("confidence.high", "high confidence"),
    ("confidence.medium", "medium confidence"),
    ("confidence.low", "low confidence"),
    ("impact.high", "high impact"),
    ("impact.medium", "medium impact"),
    ("impact.low", "low impact"),
    ("health.at_risk", "at risk"),
    ("health.normal", "normal"),
    ("health.healthy", "healthy"),
    ("badge.top_performer", "Top performer"),
    ("badge.podium", "Podium"),
    ("badge.sharpshooter", "Sharpshooter"),
    ("badge.big_hitter", "Big hitter"),
    ("badge.on_fire", "On fire"),
    (
        "insight.growth.headline",
        "{{ period }}: estimated growth of {{ growth }}% across {{ deal_count }} deals.",
    ),
    (
        "insight.analysis.summary",
        "{{ customer }} on {{ product }} has a {{ likelihood }}% chance of closing.",
    ),
    ("insight.risk.low_probability", "Stated probability is only {{ probability }}%."),
    ("insight.risk.unassigned", "No representative owns this deal."),
    ("insight.risk.low_health", "Health score is down to {{ health }}."),
    ("insight.next_step", "Discuss {{ product }} in the next call."),
    ("insight.email.subject", "{{ product }} for {{ customer }}: next steps"),
    (
        "insight.email.body",
        "Hello {{ customer }} team,\n\nThank you for your time on \"{{ title }}\". \
         I would like to walk you through how {{ product }} fits your plans. \
         Would a short call this week work?\n",
    ),
];

const TR_TEMPLATES: &[(&str, &str)] = &[
    ("narrative.status.high", "Fırsat hacmi yüksek: {{ deal_count }} fırsat izleniyor."),
    ("narrative.status.stable", "Fırsat hacmi {{ deal_count }} fırsatla stabil."),
    ("narrative.trend.increasing", "Dönüşüm %{{ conversion_rate }} ile artıyor."),
    ("narrative.trend.stable", "Dönüşüm %{{ conversion_rate }} ile sabit."),
    ("narrative.trend.decreasing", "Dönüşüm %{{ conversion_rate }} ile düşüyor."),
    ("narrative.loss.needs_attention", "{{ lost_count }} kayıp fırsat dikkat gerektiriyor."),
    ("narrative.loss.under_control", "Kayıplar kontrol altında ({{ lost_count }} kayıp)."),
    ("narrative.pipeline.strong", "Açık satış hattı {{ open_value }} ile güçlü."),
    ("narrative.pipeline.stable", "Açık satış hattı {{ open_value }} ile stabil."),
    ("narrative.pipeline.weak", "Açık satış hattı {{ open_value }} ile zayıf."),
    ("narrative.top_product", "{{ product }} {{ count }} fırsatla önde."),
    ("narrative.top_product.none", "Henüz öne çıkan bir ürün yok."),
    ("recommendation.cross_sell.summary", "{{ source_product }} ile birlikte {{ product }} önerin."),
    (
        "recommendation.cross_sell.detail",
        "{{ customer }} {{ source_product }} alıyor; benzer müşteriler genellikle {{ product }} ekliyor.",
    ),
    ("recommendation.benchmark.summary", "{{ product }} ile kıyaslayın."),
    (
        "recommendation.benchmark.detail",
        "{{ value }} tutarındaki bu fırsat {{ customer }} için {{ product }} konumlandırmaya uygun.",
    ),
    ("recommendation.upsell.summary", "Teklife {{ product }} ekleyin."),
    (
        "recommendation.upsell.detail",
        "{{ customer }}, {{ source_product }} ürününü yönetilen {{ product }} üzerinde çalıştırabilir.",
    ),
    ("recommendation.reactivation.summary", "{{ product }} ile yeniden temas kurun."),
    (
        "recommendation.reactivation.detail",
        "Fırsat {{ aging_days }} gündür aynı aşamada; bir {{ product }} görüşmesi süreci canlandırabilir.",
    ),
    ("recommendation.none", "Bu fırsat için öneri yok."),
    ("confidence.high", "yüksek güven"),
    ("confidence.medium", "orta güven"),
    ("confidence.low", "düşük güven"),
    ("impact.high", "yüksek etki"),
    ("impact.medium", "orta etki"),
    ("impact.low", "düşük etki"),
    ("health.at_risk", "riskli"),
    ("health.normal", "normal"),
    ("health.healthy", "sağlıklı"),
    ("badge.top_performer", "Lider"),
    ("badge.podium", "Kürsü"),
    ("badge.sharpshooter", "Keskin nişancı"),
    ("badge.big_hitter", "Büyük vuruş"),
    ("badge.on_fire", "Alev aldı"),
    (
        "insight.growth.headline",
        "{{ period }}: {{ deal_count }} fırsatta tahmini büyüme %{{ growth }}.",
    ),
    (
        "insight.analysis.summary",
        "{{ customer }} / {{ product }} için kapanma olasılığı %{{ likelihood }}.",
    ),
    ("insight.risk.low_probability", "Belirtilen olasılık yalnızca %{{ probability }}."),
    ("insight.risk.unassigned", "Bu fırsatın sorumlusu yok."),
    ("insight.risk.low_health", "Sağlık skoru {{ health }} seviyesine düştü."),
    ("insight.next_step", "Bir sonraki görüşmede {{ product }} konusunu açın."),
    ("insight.email.subject", "{{ customer }} için {{ product }}: sonraki adımlar"),
    (
        "insight.email.body",
        "Merhaba {{ customer }} ekibi,\n\n\"{{ title }}\" için ayırdığınız zaman için teşekkürler. \
         {{ product }} çözümünün planlarınıza nasıl uyduğunu anlatmak isterim. \
         Bu hafta kısa bir görüşme uygun olur mu?\n",
    ),
];

/// Locale-aware message catalog backed by tera.
///
/// Missing keys fall back to English, then to the key itself.
pub struct TemplateCatalog {
    locale: Locale,
    tera: Tera,
}

impl TemplateCatalog {
    pub fn new(locale: Locale) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        for (code, templates) in [(Locale::En, EN_TEMPLATES), (Locale::Tr, TR_TEMPLATES)] {
            let named: Vec<(String, &str)> = templates
                .iter()
                .map(|(key, body)| (template_name(code, key), *body))
                .collect();
            tera.add_raw_templates(named)?;
        }
        Ok(Self { locale, tera })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn has_key(&self, locale: Locale, key: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template_name(locale, key))
    }

    fn render(&self, locale: Locale, key: &str, context: &Context) -> Option<String> {
        let name = template_name(locale, key);
        if !self.tera.get_template_names().any(|candidate| candidate == name) {
            return None;
        }
        match self.tera.render(&name, context) {
            Ok(text) => Some(text),
            Err(error) => {
                tracing::debug!(
                    event_name = "cli.render.template_failed",
                    key,
                    locale = locale.code(),
                    error = %error,
                    "template render failed"
                );
                None
            }
        }
    }
}

impl Translate for TemplateCatalog {
    fn translate(&self, key: &str, params: &BTreeMap<String, String>) -> String {
        let mut context = Context::new();
        for (name, value) in params {
            context.insert(name.as_str(), value);
        }

        self.render(self.locale, key, &context)
            .or_else(|| self.render(Locale::En, key, &context))
            .unwrap_or_else(|| key.to_string())
    }
}

fn template_name(locale: Locale, key: &str) -> String {
    format!("{}/{key}", locale.code())
}
