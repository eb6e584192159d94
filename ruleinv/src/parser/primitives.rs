use crate::ast::Span;
use crate::error::RuleInvError;
use crate::parser::{LineContext, Rule};
use crate::rule::{decode_position, CharClass, Primitive, PrimitiveKind};
use pest::iterators::Pair;

pub(crate) fn parse_primitive(
    pair: Pair<Rule>,
    ctx: &LineContext,
) -> Result<Primitive, RuleInvError> {
    let span = Span::from_pest_span(pair.as_span(), ctx.line);
    let rule = pair.as_rule();

    if rule == Rule::nullary {
        let kind = parse_nullary(pair.as_str(), ctx, &span)?;
        return Ok(Primitive::new(kind, Some(span)));
    }
    if rule == Rule::unsupported {
        return Ok(Primitive::new(parse_unsupported(pair), Some(span)));
    }

    let mut args = Args::new(pair, ctx, &span);
    use PrimitiveKind as K;
    let kind = match rule {
        Rule::replace_class => K::ReplaceClass(args.class()?, args.byte()?),
        Rule::replace => K::Replace(args.byte()?, args.byte()?),
        Rule::purge_class => K::PurgeClass(args.class()?),
        Rule::purge => K::Purge(args.byte()?),
        Rule::reject_contains_class => K::RejectContainsClass(args.class()?),
        Rule::reject_contains => K::RejectContains(args.byte()?),
        Rule::reject_not_contains_class => K::RejectNotContainsClass(args.class()?),
        Rule::reject_not_contains => K::RejectNotContains(args.byte()?),
        Rule::reject_first_class => K::RejectUnlessFirstClass(args.class()?),
        Rule::reject_first => K::RejectUnlessFirst(args.byte()?),
        Rule::reject_last_class => K::RejectUnlessLastClass(args.class()?),
        Rule::reject_last => K::RejectUnlessLast(args.byte()?),
        Rule::reject_at_class => K::RejectUnlessAtClass(args.pos()?, args.class()?),
        Rule::reject_at => K::RejectUnlessAt(args.pos()?, args.byte()?),
        Rule::reject_count_class => K::RejectUnlessCountClass(args.pos()?, args.class()?),
        Rule::reject_count => K::RejectUnlessCount(args.pos()?, args.byte()?),
        Rule::toggle_at => K::ToggleAt(args.pos()?),
        Rule::duplicate_n => K::DuplicateN(args.pos()?),
        Rule::delete_at => K::DeleteAt(args.pos()?),
        Rule::extract => K::Extract(args.pos()?, args.pos()?),
        Rule::omit => K::Omit(args.pos()?, args.pos()?),
        Rule::insert_at => K::InsertAt(args.pos()?, args.byte()?),
        Rule::overwrite_at => K::OverwriteAt(args.pos()?, args.byte()?),
        Rule::truncate => K::Truncate(args.pos()?),
        Rule::duplicate_first => K::DuplicateFirst(args.pos()?),
        Rule::duplicate_last => K::DuplicateLast(args.pos()?),
        Rule::swap_at => K::SwapAt(args.pos()?, args.pos()?),
        Rule::bitshift_left => K::BitShiftLeft(args.pos()?),
        Rule::bitshift_right => K::BitShiftRight(args.pos()?),
        Rule::increment => K::Increment(args.pos()?),
        Rule::decrement => K::Decrement(args.pos()?),
        Rule::replace_next => K::ReplaceWithNext(args.pos()?),
        Rule::replace_prior => K::ReplaceWithPrior(args.pos()?),
        Rule::block_front => K::DuplicateBlockFront(args.pos()?),
        Rule::block_back => K::DuplicateBlockBack(args.pos()?),
        Rule::title_separator => K::TitleCaseSeparator(args.byte()?),
        Rule::toggle_after_nth => K::ToggleAfterNth(args.pos()?, args.byte()?),
        Rule::insert_memory => K::InsertMemory(args.pos()?, args.pos()?, args.pos()?),
        Rule::reject_less => K::RejectLess(args.pos()?),
        Rule::reject_greater => K::RejectGreater(args.pos()?),
        Rule::reject_length => K::RejectUnlessLength(args.pos()?),
        Rule::append => K::Append(args.byte()?),
        Rule::prepend => K::Prepend(args.byte()?),
        other => {
            return Err(ctx.error(
                format!("Grammar error: unexpected primitive rule {:?}", other),
                span,
            ))
        }
    };

    Ok(Primitive::new(kind, Some(span)))
}

fn parse_nullary(
    text: &str,
    ctx: &LineContext,
    span: &Span,
) -> Result<PrimitiveKind, RuleInvError> {
    use PrimitiveKind as K;
    let kind = match text {
        ":" => K::Noop,
        "l" => K::Lowercase,
        "u" => K::Uppercase,
        "c" => K::Capitalize,
        "C" => K::InvertCapitalize,
        "t" => K::ToggleCase,
        "r" => K::Reverse,
        "d" => K::Duplicate,
        "f" => K::Reflect,
        "{" => K::RotateLeft,
        "}" => K::RotateRight,
        "[" => K::DeleteFirst,
        "]" => K::DeleteLast,
        "q" => K::DuplicateAll,
        "k" => K::SwapFront,
        "K" => K::SwapBack,
        "E" => K::TitleCase,
        "M" => K::Memorize,
        "4" => K::AppendMemory,
        "6" => K::PrependMemory,
        "Q" => K::RejectEqualsMemory,
        "S" => K::ShiftCase,
        "V" => K::VowelCase,
        "P" => K::PastTense,
        "I" => K::Gerund,
        other => {
            return Err(ctx.error(
                format!("Grammar error: unknown nullary command '{}'", other),
                span.clone(),
            ))
        }
    };
    Ok(kind)
}

fn parse_unsupported(pair: Pair<Rule>) -> PrimitiveKind {
    let mut opcode = '\u{fffd}';
    let mut rest = String::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::unsupported_op => opcode = inner.as_str().chars().next().unwrap_or(opcode),
            Rule::unsupported_rest => rest = inner.as_str().to_string(),
            _ => {}
        }
    }
    PrimitiveKind::Unsupported { opcode, rest }
}

/// Sequential reader over the argument pairs of one primitive
struct Args<'i, 'c> {
    inner: pest::iterators::Pairs<'i, Rule>,
    ctx: &'c LineContext<'c>,
    span: &'c Span,
}

impl<'i, 'c> Args<'i, 'c> {
    fn new(pair: Pair<'i, Rule>, ctx: &'c LineContext<'c>, span: &'c Span) -> Self {
        Self {
            inner: pair.into_inner(),
            ctx,
            span,
        }
    }

    fn next(&mut self, expected: Rule) -> Result<Pair<'i, Rule>, RuleInvError> {
        match self.inner.next() {
            Some(pair) if pair.as_rule() == expected => Ok(pair),
            _ => Err(self.ctx.error(
                format!("Grammar error: expected {:?} argument", expected),
                self.span.clone(),
            )),
        }
    }

    fn pos(&mut self) -> Result<usize, RuleInvError> {
        let pair = self.next(Rule::pos)?;
        let c = pair.as_str().chars().next().unwrap_or(' ');
        decode_position(c).ok_or_else(|| {
            self.ctx
                .error(format!("invalid position '{}'", c), self.span.clone())
        })
    }

    fn byte(&mut self) -> Result<u8, RuleInvError> {
        let pair = self.next(Rule::byte)?;
        let arg_span = Span::from_pest_span(pair.as_span(), self.ctx.line);
        let text = pair.as_str();
        if let Some(hex) = pair.into_inner().find(|p| p.as_rule() == Rule::hex_byte) {
            let digits = &hex.as_str()[2..];
            return u8::from_str_radix(digits, 16).map_err(|_| {
                self.ctx
                    .error(format!("invalid hex escape '{}'", hex.as_str()), arg_span)
            });
        }
        match text.as_bytes() {
            [b] => Ok(*b),
            _ => Err(RuleInvError::parse_with_suggestion(
                format!("argument '{}' is not a single byte", text),
                arg_span,
                self.ctx.source_id,
                self.ctx.text.clone(),
                self.ctx.index,
                "write non-ASCII bytes as \\xHH escapes",
            )),
        }
    }

    fn class(&mut self) -> Result<CharClass, RuleInvError> {
        let pair = self.next(Rule::class)?;
        let code = pair.as_str().chars().nth(1).unwrap_or(' ');
        CharClass::from_code(code).ok_or_else(|| {
            self.ctx
                .error(format!("unknown character class '?{}'", code), self.span.clone())
        })
    }
}
