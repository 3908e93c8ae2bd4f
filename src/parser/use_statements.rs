/// `use` statement handling.
///
/// Class imports become aliases in the current [`Scope`].  Function and
/// constant imports never name a type, so they are skipped.
use mago_syntax::ast::*;

use crate::scope::Scope;
use crate::util::short_name;

/// Register every class import of a `use` statement in `scope`.
pub(crate) fn register_use_items(items: &UseItems, scope: &mut Scope) {
    match items {
        UseItems::Sequence(seq) => {
            // `use Foo\Bar;` or `use Foo\Bar, Baz\Qux;`
            for item in seq.items.iter() {
                register_use_item(item, None, scope);
            }
        }
        UseItems::TypedSequence(seq) => {
            // `use function Foo\bar;` / `use const Foo\BAR;`
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, scope);
            }
        }
        UseItems::TypedList(list) => {
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), scope);
            }
        }
        UseItems::MixedList(list) => {
            // `use Foo\{Bar, function baz, const QUX};`
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), scope);
            }
        }
    }
}

/// Register one `UseItem`, relative to `group_prefix` for grouped imports.
fn register_use_item(item: &UseItem, group_prefix: Option<&str>, scope: &mut Scope) {
    let item_name = item.name.value();

    let fqn = match group_prefix {
        Some(prefix) => format!(
            "\\{}\\{}",
            prefix.trim_matches('\\'),
            item_name.trim_start_matches('\\')
        ),
        None => format!("\\{}", item_name.trim_start_matches('\\')),
    };

    let alias = match &item.alias {
        Some(alias) => alias.identifier.value.to_string(),
        None => short_name(&fqn).to_string(),
    };

    scope.add_use(alias, fqn);
}
