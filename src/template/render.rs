//! Name resolution, template execution and subject extraction

use scraper::{Html, Node};

use super::store::{TemplateGroup, TemplateStore};
use super::types::{
    RenderRequest, RenderedMail, RenderedTemplate, TemplateError, TemplateResult,
    DEFAULT_TEMPLATE,
};

impl TemplateGroup {
    /// Pick the first candidate the group defines, falling back to `default`.
    ///
    /// On a miss the error names the first requested candidate.
    pub fn resolve<'a>(&'a self, candidates: &'a [String]) -> TemplateResult<&'a str> {
        if let Some(name) = candidates.iter().find(|name| self.contains(name)) {
            return Ok(name.as_str());
        }

        if self.contains(DEFAULT_TEMPLATE) {
            return Ok(DEFAULT_TEMPLATE);
        }

        let requested = candidates
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_TEMPLATE);
        Err(TemplateError::TemplateNotFound(requested.to_string()))
    }

    /// Execute one template and pull its subject out of the markup
    pub fn render_template(
        &self,
        template: &str,
        data: &serde_json::Value,
    ) -> TemplateResult<RenderedTemplate> {
        let output = self
            .registry()
            .render(template, data)
            .map_err(|e| TemplateError::Render {
                template: template.to_string(),
                message: e.to_string(),
            })?;

        let body = output.trim().to_string();
        let subject = extract_title(&body)
            .ok_or_else(|| TemplateError::TitleNotFound(template.to_string()))?;

        Ok(RenderedTemplate {
            template: template.to_string(),
            subject,
            body,
        })
    }

    /// Resolve a template from the candidates and render it
    pub fn render(
        &self,
        candidates: &[String],
        data: &serde_json::Value,
    ) -> TemplateResult<RenderedTemplate> {
        let template = self.resolve(candidates)?;
        if candidates.first().is_some_and(|requested| requested != template) {
            tracing::debug!(
                group = %self.name(),
                requested = ?candidates,
                resolved = %template,
                "Falling back to another template"
            );
        }

        self.render_template(template, data)
    }
}

impl TemplateStore {
    /// Render a template from `group` against `data`
    pub fn render(
        &self,
        group: &str,
        candidates: &[String],
        data: &serde_json::Value,
    ) -> TemplateResult<RenderedTemplate> {
        self.group(group)?.render(candidates, data)
    }

    /// Render a request into a message addressed to its recipients
    pub fn render_mail(&self, request: &RenderRequest) -> TemplateResult<RenderedMail> {
        let rendered = self.render(&request.group, &request.names, &request.data)?;

        Ok(RenderedMail {
            template: rendered.template,
            subject: rendered.subject,
            body: rendered.body,
            sender: request.sender.clone(),
            recipients: request.recipients.clone(),
        })
    }
}

/// Text of the first `<title>` element holding a text node, in document order.
///
/// Line breaks are folded into single spaces so the result fits on one
/// header line.
pub fn extract_title(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);

    document.tree.root().descendants().find_map(|node| match node.value() {
        Node::Element(element) if element.name() == "title" => node
            .children()
            .find_map(|child| child.value().as_text().map(|text| fold_lines(text))),
        _ => None,
    })
}

fn fold_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
