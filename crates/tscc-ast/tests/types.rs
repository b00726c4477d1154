use super::*;

#[test]
fn test_non_nullable_unwraps_single_member() {
    let ty = TypeDescriptor::class("Foo").nullable();
    assert_eq!(ty.non_nullable(), Some(&TypeDescriptor::class("Foo")));
    assert_eq!(ty.as_object().map(|o| o.name.as_str()), Some("Foo"));
}

#[test]
fn test_non_nullable_rejects_real_unions() {
    let ty = TypeDescriptor::union(vec![TypeDescriptor::string(), TypeDescriptor::number()]);
    assert_eq!(ty.non_nullable(), None);
    let only_null = TypeDescriptor::union(vec![TypeDescriptor::null(), TypeDescriptor::undefined()]);
    assert_eq!(only_null.non_nullable(), None);
}

#[test]
fn test_weak_marks_union_member() {
    let ty = TypeDescriptor::class("Foo").nullable().weak();
    assert_eq!(ty.as_object().map(|o| o.ownership), Some(RefOwnership::Weak));
}

#[test]
fn test_number_alias_lookup() {
    assert_eq!(NumberKind::from_alias("int64"), Some(NumberKind::Int64));
    assert_eq!(NumberKind::from_alias("number"), None);
    assert_eq!(NumberKind::Uint32.runtime_name(), "Uint32");
}

#[test]
fn test_display_prefers_declared_text() {
    assert_eq!(TypeDescriptor::number_alias("int").to_string(), "int");
    let func = TypeDescriptor::function(
        vec![("name", TypeDescriptor::string())],
        TypeDescriptor::string(),
    )
    .nullable();
    assert_eq!(func.to_string(), "(name: string) => string | undefined");
    let generic = TypeDescriptor::generic("Array", vec![TypeDescriptor::string()]);
    assert_eq!(generic.to_string(), "Array<string>");
}
