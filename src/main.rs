fn main() {
    grammar_chat_lib::run()
}
