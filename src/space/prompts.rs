//! Prompt templates for the design-space oracle calls.
//!
//! Rendered with one-off tera templates; the XML scaffolding in each
//! template is what `markup` later scans for, so template and scanner evolve
//! together.

use tera::{Context, Tera};

const CREATE_SPACE: &str = "\
You are building a design space for a {{ domain }} of a {{ concept }}.

List the axes along which this design space varies. For example, an image of \
a car could vary along \"car_type\", \"car_color\", \"background\", \
\"camera_angle\". Produce between 4 and 6 concrete axes. Each axis should be \
1-4 words and not duplicate the others.

Return the list of axes in an <axes></axes> XML tag, like this:

<axes>
<axis>AXIS HERE</axis>
<axis>AXIS HERE</axis>
<axis>AXIS HERE</axis>
</axes>
{%- if context %}

Here is additional context to inform the design space:
{{ context }}
{%- endif %}";

const FILL_SPACE: &str = "\
Here is the set of axes in the design space for a {{ domain }} of a \
{{ concept }}:

<axes>
{{ axes }}
</axes>

Come up with the most likely value for each axis.

Return the design space in an <axes></axes> XML tag, like this:

<axes>
<axis name=\"AXIS NAME HERE\">AXIS VALUE HERE</axis>
<axis name=\"AXIS NAME HERE\">AXIS VALUE HERE</axis>
<axis name=\"AXIS NAME HERE\">AXIS VALUE HERE</axis>
</axes>";

const EXPLORE_AXIS: &str = "\
Here is an axis in the design space of a {{ domain }} of a {{ concept }}:
{{ axis }}

Create {{ n }} possible values for the axis. They should be meaningfully \
different and vary along only this axis. If the axis is continuous in any \
way, order your options along that continuum (shortest to tallest, darkest \
to lightest, and so on).

Return the values in an <options></options> XML tag, like this:

<options>
<option>OPTION HERE</option>
<option>OPTION HERE</option>
<option>OPTION HERE</option>
</options>";

const EXTRACT_TAGS: &str = "\
Here is the description of a generated {{ domain }}:

<description>
{{ description }}
</description>

And here are the open axes of its design space:
{% for axis in axes %}{{ axis }}
{% endfor %}
Extract exactly one tag for each listed axis, describing the value the \
description expresses for that axis in a concise manner (1-4 words).
{%- if used %}
Avoid reusing any of these tags: {{ used | join(sep=\", \") }}.
{%- endif %}

Enclose each tag in <tag></tag> XML tags and return the list in a \
<tags></tags> XML tag, like this:

<tags>
<tag dimension=\"AXIS NAME HERE\">TAG HERE</tag>
<tag dimension=\"AXIS NAME HERE\">TAG HERE</tag>
</tags>";

const RECONCILE_FEEDBACK: &str = "\
Here is the current design space for a {{ domain }} of a {{ concept }}:

<design_space>
{{ space }}
</design_space>

A reviewer left this feedback on the generated examples:

<feedback>
{{ feedback }}
</feedback>

Update the design space to honor the feedback. Mark an axis \"constrained\" \
with a concrete value when the feedback pins it down, and \"unconstrained\" \
when it remains open. Of the axes that are not constrained, you may mark one \
\"exploring\" if the feedback asks to vary it; if one is already exploring, \
don't change it.

Return the design space in an <axes></axes> XML tag, like this:

<axes>
<axis name=\"AXIS NAME HERE\" status=\"STATUS HERE\">AXIS VALUE HERE</axis>
<axis name=\"AXIS NAME HERE\" status=\"STATUS HERE\">AXIS VALUE HERE</axis>
</axes>";

pub fn create_space(
    concept: &str,
    domain: &str,
    context: Option<&str>,
) -> anyhow::Result<String> {
    let mut ctx = Context::new();
    ctx.insert("concept", concept);
    ctx.insert("domain", domain);
    ctx.insert("context", &context);
    render(CREATE_SPACE, &ctx)
}

pub fn fill_space(concept: &str, domain: &str, axes: &str) -> anyhow::Result<String> {
    let mut ctx = Context::new();
    ctx.insert("concept", concept);
    ctx.insert("domain", domain);
    ctx.insert("axes", axes);
    render(FILL_SPACE, &ctx)
}

pub fn explore_axis(concept: &str, domain: &str, axis: &str, n: usize) -> anyhow::Result<String> {
    let mut ctx = Context::new();
    ctx.insert("concept", concept);
    ctx.insert("domain", domain);
    ctx.insert("axis", axis);
    ctx.insert("n", &n);
    render(EXPLORE_AXIS, &ctx)
}

pub fn extract_tags(
    domain: &str,
    description: &str,
    axes: &[&str],
    used: &[String],
) -> anyhow::Result<String> {
    let mut ctx = Context::new();
    ctx.insert("domain", domain);
    ctx.insert("description", description);
    ctx.insert("axes", axes);
    ctx.insert("used", used);
    render(EXTRACT_TAGS, &ctx)
}

pub fn reconcile_feedback(
    concept: &str,
    domain: &str,
    space: &str,
    feedback: &str,
) -> anyhow::Result<String> {
    let mut ctx = Context::new();
    ctx.insert("concept", concept);
    ctx.insert("domain", domain);
    ctx.insert("space", space);
    ctx.insert("feedback", feedback);
    render(RECONCILE_FEEDBACK, &ctx)
}

fn render(template: &str, ctx: &Context) -> anyhow::Result<String> {
    let rendered = Tera::one_off(template, ctx, false)?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_space_includes_concept_and_domain() {
        let prompt = create_space("elephant", "Image", None).unwrap();
        assert!(prompt.contains("Image of a elephant"));
        assert!(prompt.contains("<axes>"));
        assert!(!prompt.contains("additional context"));
    }

    #[test]
    fn create_space_appends_context_when_present() {
        let prompt = create_space("elephant", "Image", Some("prefer savanna scenes")).unwrap();
        assert!(prompt.contains("additional context"));
        assert!(prompt.contains("prefer savanna scenes"));
    }

    #[test]
    fn explore_axis_includes_count_and_axis() {
        let prompt = explore_axis("elephant", "Image", "color", 3).unwrap();
        assert!(prompt.contains("Create 3 possible values"));
        assert!(prompt.contains("color"));
        assert!(prompt.contains("<options>"));
    }

    #[test]
    fn fill_space_embeds_axis_lines() {
        let prompt = fill_space("elephant", "Image", "color: \npose: ").unwrap();
        assert!(prompt.contains("color: \npose: "));
        assert!(prompt.contains("name=\"AXIS NAME HERE\""));
    }

    #[test]
    fn extract_tags_lists_axes_and_used_set() {
        let used = vec!["red".to_string()];
        let prompt = extract_tags("Image", "a red elephant", &["color", "pose"], &used).unwrap();
        assert!(prompt.contains("color\npose"));
        assert!(prompt.contains("Avoid reusing any of these tags: red."));
    }

    #[test]
    fn extract_tags_omits_used_clause_when_empty() {
        let prompt = extract_tags("Image", "a red elephant", &["color"], &[]).unwrap();
        assert!(!prompt.contains("Avoid reusing"));
    }

    #[test]
    fn reconcile_feedback_embeds_space_and_feedback() {
        let prompt =
            reconcile_feedback("elephant", "Image", "color (constrained) : red", "more dusk light")
                .unwrap();
        assert!(prompt.contains("color (constrained) : red"));
        assert!(prompt.contains("more dusk light"));
        assert!(prompt.contains("status=\"STATUS HERE\""));
    }
}
