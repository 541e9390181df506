use talecraft_engine::{parse_narration, Attribute, DiceDirective};

#[test]
fn directive_line_is_removed() {
    let p = parse_narration("The radio crackles with a voice you know.\n[DICE_CHECK: wisdom DC:14]\n**A)** Option");
    assert_eq!(p.directive, Some(DiceDirective { attribute: Attribute::Wisdom, dc: 14 }));
    insta::assert_snapshot!(p.text, @r"
    The radio crackles with a voice you know.
    **A)** Option
    ");
}

#[test]
fn unknown_attribute_leaves_text_alone() {
    let text = "You brace against the door.\n[DICE_CHECK: strength DC:14]\n**A)** Push";
    let p = parse_narration(text);
    assert_eq!(p.directive, None);
    assert_eq!(p.text, text);
}

#[test]
fn inline_tag_is_cut_and_sides_joined() {
    let p = parse_narration("Something moves [DICE_CHECK: Vision DC: 11] in the trees.");
    assert_eq!(p.directive.map(|d| d.dc), Some(11));
    insta::assert_snapshot!(p.text, @"Something moves in the trees.");
}

#[test]
fn only_the_first_directive_counts() {
    let p = parse_narration("[DICE_CHECK: influence DC:8]\nThen:\n[DICE_CHECK: audacity DC:16]");
    assert_eq!(p.directive, Some(DiceDirective { attribute: Attribute::Influence, dc: 8 }));
    insta::assert_snapshot!(p.text, @r"
    Then:
    [DICE_CHECK: audacity DC:16]
    ");
}

#[test]
fn negative_dc_does_not_match() {
    let text = "Try it. [DICE_CHECK: wisdom DC:-3]";
    assert_eq!(parse_narration(text).directive, None);
}
